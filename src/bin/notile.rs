use anyhow::{bail, Context};
use clap::{Arg, ArgAction, Command};
use log::debug;
use notile::{open_settings, render_with_report, save_settings, write_png};
use notile::{Color, RenderMethod, Report, Settings};

/// Parses `N` comma separated values.
fn parse_list<T, const N: usize>(s: &str) -> anyhow::Result<[T; N]>
    where T: std::str::FromStr + Copy + Default,
          T::Err: std::error::Error + Send + Sync + 'static,
{
    let mut res = [T::default(); N];
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {bail!("expected {} comma separated values, got `{}`", N, s)};
    for (v, part) in res.iter_mut().zip(parts) {
        *v = part.parse().with_context(|| format!("invalid value `{}`", part))?;
    }
    Ok(res)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("notile")
        .about("Renders the placeholder texture for missing map tiles")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .action(ArgAction::Set)
                .help("Output file `*.png` [default: no_tile.png]")
        )
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .action(ArgAction::Set)
                .help("Width and height in pixels [default: 256]")
        )
        .arg(
            Arg::new("octaves")
                .long("octaves")
                .action(ArgAction::Set)
                .help("First and last octave `MIN,MAX` [default: 1,7]")
        )
        .arg(
            Arg::new("background")
                .long("background")
                .action(ArgAction::Set)
                .help("Background color `R,G,B` in 0..1 [default: 0.125,0.125,0.125]")
        )
        .arg(
            Arg::new("foreground")
                .long("foreground")
                .action(ArgAction::Set)
                .help("Line color `R,G,B` in 0..1 [default: 0.25,0.25,0.25]")
        )
        .arg(
            Arg::new("parallel")
                .short('j')
                .long("parallel")
                .action(ArgAction::SetTrue)
                .help("Fill rows on all CPU cores")
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .action(ArgAction::Set)
                .help("Settings file to start from")
        )
        .arg(
            Arg::new("save-settings")
                .long("save-settings")
                .action(ArgAction::Set)
                .help("Write the resulting settings to file")
        )
        .get_matches();

    let mut settings = match matches.get_one::<String>("settings") {
        Some(file) => open_settings(file)
            .with_context(|| format!("failed to open settings `{}`", file))?,
        None => Settings::default(),
    };
    if let Some(output) = matches.get_one::<String>("output") {
        settings.output = output.clone();
    }
    if let Some(size) = matches.get_one::<String>("size") {
        settings.size = size.parse().with_context(|| format!("invalid size `{}`", size))?;
    }
    if let Some(octaves) = matches.get_one::<String>("octaves") {
        settings.octaves = parse_list(octaves)?;
    }
    if let Some(color) = matches.get_one::<String>("background") {
        settings.background = Color(parse_list(color)?);
    }
    if let Some(color) = matches.get_one::<String>("foreground") {
        settings.foreground = Color(parse_list(color)?);
    }
    if matches.get_flag("parallel") {
        settings.method = RenderMethod::Parallel;
    }
    settings.validate()?;

    if let Some(file) = matches.get_one::<String>("save-settings") {
        save_settings(file, &settings)
            .with_context(|| format!("failed to save settings `{}`", file))?;
    }

    let report = Report::steps(settings.size, 4);
    let img = render_with_report(&settings, report, |progress| {
        debug!("{:.2} %", 100.0 * progress);
    })?;
    write_png(&img, &settings.output)?;
    Ok(())
}
