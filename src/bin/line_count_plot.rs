use line_count_plot::plot::parse_cli;
use line_count_plot::run;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // logs go to stderr, stdout only carries the failure message
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let (datin, pngout, no_display) = parse_cli();
    info!(
        "read data from {} and plot to {}",
        datin.display(),
        pngout.display()
    );
    if let Err(e) = run(&datin, &pngout, !no_display) {
        println!("{}", e.user_message());
        std::process::exit(1);
    }
}
