use super::RenderError;
use std::num::NonZeroU32;
use tracing::{debug, warn};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Window, WindowBuilder};

const BACKGROUND: u32 = 0x00FF_FFFF;
pub const DISPLAY_VARS: [&str; 2] = ["DISPLAY", "WAYLAND_DISPLAY"];

/// False when there is obviously no display server to open a window on,
/// e.g. a CI runner or an ssh session without forwarding.
pub fn display_available() -> bool {
    if cfg!(all(unix, not(target_os = "macos"))) {
        DISPLAY_VARS
            .iter()
            .any(|v| std::env::var_os(v).map_or(false, |s| !s.is_empty()))
    } else {
        true
    }
}

/// packs RGB8 pixels into the 0RGB u32 layout softbuffer expects
pub fn rgb_to_pixels(rgb: &[u8]) -> Vec<u32> {
    rgb.chunks_exact(3)
        .map(|px| ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32)
        .collect()
}

fn display_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Display(e.to_string())
}

/// winit 0.28 panics when the display server cannot be reached;
/// the panic comes back as `RenderError::Display`. The panic hook is muted while opening.
fn open_event_loop() -> Result<EventLoop<()>, RenderError> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    let opened = std::panic::catch_unwind(EventLoop::<()>::new);
    std::panic::set_hook(hook);
    opened.map_err(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "failed to initialise the event loop".to_string());
        RenderError::Display(msg)
    })
}

/// Shows the RGB8 figure in a window and blocks until the window is closed.
pub fn show_rgb(title: &str, rgb: &[u8], size: (u32, u32)) -> Result<(), RenderError> {
    let (width, height) = size;
    if rgb.len() != width as usize * height as usize * 3 {
        return Err(RenderError::Display(format!(
            "buffer of {} bytes does not match a {}x{} figure",
            rgb.len(),
            width,
            height
        )));
    }
    let pixels = rgb_to_pixels(rgb);

    let mut event_loop = open_event_loop()?;
    let window = WindowBuilder::new()
        .with_title(title)
        .with_inner_size(PhysicalSize::new(width, height))
        .with_resizable(false)
        .build(&event_loop)
        .map_err(display_err)?;
    let context = unsafe { softbuffer::Context::new(&window) }.map_err(display_err)?;
    let mut surface = unsafe { softbuffer::Surface::new(&context, &window) }.map_err(display_err)?;
    debug!("opened window {}x{}", width, height);

    let mut failure: Option<RenderError> = None;
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                window_id,
            } if window_id == window.id() => *control_flow = ControlFlow::Exit,
            Event::RedrawRequested(window_id) if window_id == window.id() => {
                if let Err(e) = blit(&mut surface, &window, &pixels, width) {
                    warn!("could not draw the figure: {}", e);
                    failure = Some(e);
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    });
    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Copies the figure into the window, top-left aligned and cropped to the window.
fn blit(
    surface: &mut softbuffer::Surface,
    window: &Window,
    pixels: &[u32],
    width: u32,
) -> Result<(), RenderError> {
    let inner = window.inner_size();
    let (w, h) = match (NonZeroU32::new(inner.width), NonZeroU32::new(inner.height)) {
        (Some(w), Some(h)) => (w, h),
        _ => return Ok(()),
    };
    surface.resize(w, h).map_err(display_err)?;
    let mut buffer = surface.buffer_mut().map_err(display_err)?;
    buffer.fill(BACKGROUND);
    let cols = (w.get() as usize).min(width as usize);
    for (dst, src) in buffer
        .chunks_exact_mut(w.get() as usize)
        .zip(pixels.chunks_exact(width as usize))
    {
        dst[..cols].copy_from_slice(&src[..cols]);
    }
    buffer.present().map_err(display_err)?;
    Ok(())
}
