// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;

use clap::Parser;

use crate::palette::SCHEME_NAMES;

pub const DEFAULT_HEADERS: [&str; 2] = ["Across the quiet dark", "something is waking"];
pub const DEFAULT_SUBHEADER: &str = "a thousand small lights find their places";
pub const DEFAULT_TAGLINE: &str = "press q when you have seen enough";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn default_to_ascii() -> bool {
    let lang = std::env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

pub fn print_list_colors() {
    println!("COLORS:");
    for name in SCHEME_NAMES {
        println!("  {}", name);
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "starwake", version, about = "An ambient cosmic boot screen for the terminal")]
pub struct Args {
    #[arg(
        short = 'c',
        long = "color",
        default_value = "aurora",
        help_heading = "APPEARANCE",
        help = "Glow color scheme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color depth: 0=mono, 8=256-color, 24=truecolor"
    )]
    pub colormode: Option<u8>,

    #[arg(
        long = "ascii",
        help_heading = "APPEARANCE",
        help = "Force ASCII star glyphs (default follows LANG)"
    )]
    pub ascii: bool,

    #[arg(
        short = 'n',
        long = "stars",
        default_value_t = 90,
        help_heading = "FIELD",
        help = "Number of stars (min 1 max 5000)"
    )]
    pub stars: usize,

    #[arg(
        short = 's',
        long = "speed",
        default_value_t = 1.0,
        help_heading = "FIELD",
        help = "Drift speed multiplier (min 0.05 max 20)"
    )]
    pub speed: f32,

    #[arg(
        long = "seed",
        help_heading = "FIELD",
        help = "Seed the star field and glow for a reproducible run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "no-stars",
        help_heading = "FIELD",
        help = "Disable the star field"
    )]
    pub no_stars: bool,

    #[arg(
        long = "no-glow",
        help_heading = "APPEARANCE",
        help = "Disable the glow backdrop (the boot text starts immediately)"
    )]
    pub no_glow: bool,

    #[arg(
        short = 't',
        long = "title",
        help_heading = "TEXT",
        help = "Header line, repeatable; each line reveals word by word"
    )]
    pub title: Vec<String>,

    #[arg(
        long = "subtitle",
        help_heading = "TEXT",
        help = "Subheader line revealed after the headers"
    )]
    pub subtitle: Option<String>,

    #[arg(
        long = "tagline",
        help_heading = "TEXT",
        help = "Closing line revealed in one piece"
    )]
    pub tagline: Option<String>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target frames per second (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        short = 'D',
        long = "duration",
        help_heading = "GENERAL",
        help = "Exit after this many seconds"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 'S',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Exit on the first key press"
    )]
    pub screensaver: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List the glow color schemes and exit"
    )]
    pub list_colors: bool,
}
