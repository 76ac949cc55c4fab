use super::{DEFAULT_INPUT, DEFAULT_OUTPUT};
use clap::{App, Arg, ArgMatches};
use std::path::PathBuf;

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

fn cli_app<'a, 'b>() -> App<'a, 'b> {
    let arg_datin = Arg::with_name("input_datfile")
        .help("name of the line count file, one '<date> <source_lines> <test_lines>' per line")
        .short("f")
        .long("datfile")
        .takes_value(true)
        .default_value(DEFAULT_INPUT);
    let arg_pngout = Arg::with_name("output_pngfile")
        .help("name of the output png file, overwritten if present")
        .short("o")
        .long("pngfile")
        .takes_value(true)
        .default_value(DEFAULT_OUTPUT);
    let arg_no_display = Arg::with_name("no_display")
        .help("only write the png, do not open the interactive figure")
        .long("no-display");
    App::new("line_count_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot the growth of source and test lines of code over time")
        .arg(arg_datin)
        .arg(arg_pngout)
        .arg(arg_no_display)
}

fn from_matches(cli_args: &ArgMatches) -> (PathBuf, PathBuf, bool) {
    let datin = PathBuf::from(cli_args.value_of("input_datfile").unwrap_or(DEFAULT_INPUT));
    let pngout = PathBuf::from(cli_args.value_of("output_pngfile").unwrap_or(DEFAULT_OUTPUT));
    let no_display = cli_args.is_present("no_display");
    (datin, pngout, no_display)
}

/// Takes the CLI arguments that control the line count plot:
/// input file, output png and whether to skip the interactive figure.
pub fn parse_cli() -> (PathBuf, PathBuf, bool) {
    from_matches(&cli_app().get_matches())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> (PathBuf, PathBuf, bool) {
        from_matches(&cli_app().get_matches_from(args))
    }

    #[test]
    fn defaults_match_the_fixed_paths() {
        let (datin, pngout, no_display) = parse(&["line_count_plot"]);
        assert_eq!(datin, PathBuf::from("line-count.dat"));
        assert_eq!(pngout, PathBuf::from("line_count_growth.png"));
        assert!(!no_display);
    }

    #[test]
    fn paths_and_display_can_be_overridden() {
        let (datin, pngout, no_display) = parse(&[
            "line_count_plot",
            "-f",
            "history/counts.dat",
            "--pngfile",
            "out.png",
            "--no-display",
        ]);
        assert_eq!(datin, PathBuf::from("history/counts.dat"));
        assert_eq!(pngout, PathBuf::from("out.png"));
        assert!(no_display);
    }
}
