//! Startup banner: "ISB-INTEL" in figlet art with a vertical gradient.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Alert red (#ff2a2a).
const ALERT_RED: (u8, u8, u8) = (0xff, 0x2a, 0x2a);
/// Intel amber (#ffb000).
const INTEL_AMBER: (u8, u8, u8) = (0xff, 0xb0, 0x00);

const TITLE: &str = "ISB-INTEL";

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

fn art() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(TITLE).map(|f| f.to_string()))
        .unwrap_or_else(|| format!("{}\n", TITLE))
}

/// Prints the banner, then version and tagline. Falls back to plain text if the font fails.
pub fn print_welcome() {
    let mut out = stdout();
    let art = art();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(ALERT_RED, INTEL_AMBER, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: INTEL_AMBER.0,
        g: INTEL_AMBER.1,
        b: INTEL_AMBER.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", env!("CARGO_PKG_VERSION"))));
    let _ = out.execute(Print("Roblox alt-account intelligence\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
