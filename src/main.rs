// Copyright (c) 2026 rezky_nightky

mod boot;
mod cell;
mod config;
mod frame;
mod glow;
mod palette;
mod reveal;
mod starfield;
mod terminal;
mod timeline;

use std::env;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::boot::{Boot, BootText};
use crate::config::{
    color_enabled_stdout, default_to_ascii, print_list_colors, Args, DEFAULT_HEADERS,
    DEFAULT_SUBHEADER, DEFAULT_TAGLINE,
};
use crate::frame::Frame;
use crate::glow::{GlowConfig, GlowCycle};
use crate::palette::{parse_scheme, scheme_colors, ColorMode};
use crate::reveal::RevealConfig;
use crate::starfield::{Starfield, StarfieldConfig};
use crate::terminal::{restore_terminal_best_effort, Terminal};

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_f32_range(name: &str, v: f32, min: f32, max: f32) -> f32 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_usize_range(name: &str, v: usize, min: usize, max: usize) -> usize {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(m) = args.colormode {
        return match m {
            0 => ColorMode::Mono,
            8 => ColorMode::Color256,
            24 => ColorMode::TrueColor,
            _ => {
                eprintln!("invalid --colormode: {} (allowed: 0,8,24)", m);
                std::process::exit(1);
            }
        };
    }
    detect_color_mode_auto()
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    if color_enabled_stdout() {
        cmd = cmd.styles(clap_styles());
    }
    cmd.build();
    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let star_count = require_usize_range("--stars", args.stars, 1, 5000);
    let speed = require_f32_range("--speed", args.speed, 0.05, 20.0);
    let duration_s = args.duration.map(|s| {
        require_f64_range("--duration", s, 0.1, 86400.0)
    });

    let scheme = match parse_scheme(&args.color) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mode = detect_color_mode(&args);
    let ascii = args.ascii || default_to_ascii();
    let seed = args.seed.unwrap_or_else(time_seed);

    let glow_cfg = GlowConfig {
        enabled: !args.no_glow,
        ..GlowConfig::default()
    };
    let glow = GlowCycle::new(scheme_colors(scheme).to_vec(), glow_cfg, seed);

    let star_cfg = StarfieldConfig {
        count: star_count,
        drift: StarfieldConfig::default().drift * speed,
        enabled: !args.no_stars,
        ..StarfieldConfig::default()
    };
    let stars = Starfield::new(star_cfg, seed.wrapping_add(1), ascii);

    let headers = if args.title.is_empty() {
        DEFAULT_HEADERS.iter().map(|s| (*s).to_string()).collect()
    } else {
        args.title.clone()
    };
    let text = BootText {
        headers,
        subheader: args
            .subtitle
            .clone()
            .unwrap_or_else(|| DEFAULT_SUBHEADER.to_string()),
        tagline: args
            .tagline
            .clone()
            .unwrap_or_else(|| DEFAULT_TAGLINE.to_string()),
    };

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let mut frame = Frame::new(w, h);

    let mut boot = Boot::new(glow, stars, text, RevealConfig::default(), mode);
    let start_time = Instant::now();
    boot.start(start_time, w, h);

    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));
    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        boot.viewport_resized(nw, nh, Instant::now());
                    }
                    Event::Mouse(m) if m.kind == MouseEventKind::Moved => {
                        boot.pointer_moved(m.column, m.row);
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            running = false;
                            break;
                        }
                        match (k.code, k.modifiers) {
                            (KeyCode::Esc, _) => running = false,
                            (KeyCode::Char('q'), _) => running = false,
                            (KeyCode::Char('c'), KeyModifiers::CONTROL) => running = false,
                            (KeyCode::Char(' '), _) => boot.stars.respawn(),
                            (KeyCode::Char('p'), _) => boot.stars.toggle_pause(),
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if !running {
                break;
            }

            let now = Instant::now();
            let mut wake = next_frame;
            if let Some(due) = boot.next_wake() {
                wake = wake.min(due);
            }
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                wake = wake.min(end);
            }
            if now >= wake {
                break;
            }
            let _ = Terminal::poll_event(wake - now)?;
        }

        if !running {
            break;
        }

        let now = Instant::now();
        boot.handle_timers(now);
        if let Some((nw, nh)) = boot.take_settled_resize() {
            frame = Frame::new(nw, nh);
        }

        if now >= next_frame {
            boot.on_frame(now, &mut frame);
            if frame.is_dirty_all() || !frame.dirty_indices().is_empty() {
                term.draw(&mut frame)?;
            }
            next_frame += target_period;
            let after = Instant::now();
            if after > next_frame {
                next_frame = after;
            }
        }
    }

    boot.stop();
    drop(term);
    Ok(())
}
