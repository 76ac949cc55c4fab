#![cfg(all(unix, not(target_os = "macos")))]

use line_count_plot::display::DISPLAY_VARS;
use line_count_plot::{run, Error, RenderError};
use serial_test::serial;
use std::env;
use std::ffi::OsString;
use std::fs;
use tempfile::tempdir;

/// Restores the display variables when dropped.
struct DisplayEnv(Vec<(&'static str, Option<OsString>)>);

impl DisplayEnv {
    fn cleared() -> DisplayEnv {
        let saved = DISPLAY_VARS.iter().map(|v| (*v, env::var_os(v))).collect();
        for v in DISPLAY_VARS {
            env::remove_var(v);
        }
        DisplayEnv(saved)
    }
}

impl Drop for DisplayEnv {
    fn drop(&mut self) {
        for (v, value) in self.0.drain(..) {
            match value {
                Some(value) => env::set_var(v, value),
                None => env::remove_var(v),
            }
        }
    }
}

#[test]
#[serial]
fn headless_run_still_writes_the_image() {
    let _env = DisplayEnv::cleared();
    let dir = tempdir().unwrap();
    let datin = dir.path().join("line-count.dat");
    let pngout = dir.path().join("line_count_growth.png");
    fs::write(&datin, "2024-01-01 10 2\n2024-01-02 15 4\n2024-01-03 20 7\n").unwrap();

    run(&datin, &pngout, true).unwrap();
    assert!(fs::metadata(&pngout).unwrap().len() > 0);
}

#[test]
#[serial]
fn unreachable_display_is_a_render_error() {
    let _env = DisplayEnv::cleared();
    env::set_var("DISPLAY", ":97");
    let dir = tempdir().unwrap();
    let datin = dir.path().join("line-count.dat");
    let pngout = dir.path().join("line_count_growth.png");
    fs::write(&datin, "2024-01-01 10 2\n2024-01-02 15 4\n").unwrap();

    let e = run(&datin, &pngout, true).unwrap_err();
    assert!(
        matches!(e, Error::Render(RenderError::Display(_))),
        "unexpected error {:?}",
        e
    );
    assert!(e.user_message().starts_with("An error occurred: "));
    // the image is written before the window is opened
    assert!(pngout.exists());
}
