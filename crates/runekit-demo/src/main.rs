//! A thin binary exercising `FrameBuffer` end to end with a synthetic
//! animation. It builds no component tree, layout, or input handling —
//! those remain external per `spec.md` §1; this only drives the rendering
//! core the way a real component tree's frame producer would.

use anyhow::Result;
use clap::Parser;
use core_cell::Grid;
use core_config::RenderConfig;
use runekit::{Frame, FrameBuffer, FrameBufferConfig};
use std::path::Path;
use std::sync::Once;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments for the demo animation.
#[derive(Parser, Debug)]
#[command(name = "runekit-demo", version, about = "RuneKit rendering-core demo")]
struct Args {
    /// Number of animation frames to render before exiting.
    #[arg(long, default_value_t = 40)]
    frames: u32,
    /// Width of the live region, in columns.
    #[arg(long, default_value_t = 40)]
    width: u16,
    /// Use the alternate screen buffer for the duration of the demo.
    #[arg(long)]
    alt_screen: bool,
    /// Capture the process's own stdout/stderr and show them above the
    /// live region (the demo writes a line to stderr every few frames to
    /// exercise this).
    #[arg(long)]
    capture: bool,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("runekit-demo.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, "runekit-demo.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).with_writer(nb_writer).try_init() {
        Ok(_) => Some(guard),
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// A three-row frame: a title bar, a filling progress bar, and a bouncing
/// marker, all derived from `tick` and `width`.
fn frame_lines(tick: u32, total: u32, width: u16) -> Vec<String> {
    let width = width as usize;
    let filled = ((tick as f64 / total.max(1) as f64) * width as f64).round() as usize;
    let filled = filled.min(width);
    let bar: String = "#".repeat(filled) + &"-".repeat(width - filled);

    let period = (width.max(2) - 1) * 2;
    let pos = if period == 0 { 0 } else { (tick as usize) % period };
    let pos = if pos >= width { period - pos } else { pos };
    let mut marker = vec![' '; width];
    if let Some(slot) = marker.get_mut(pos) {
        *slot = '*';
    }
    let marker: String = marker.into_iter().collect();

    vec![format!("runekit demo — frame {tick}/{total}"), bar, marker]
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();

    let mut render = RenderConfig::default();
    render.use_alternate_screen = args.alt_screen;
    render.enable_console_capture = args.capture;
    render.apply_env_overrides();

    let config = FrameBufferConfig::from(render);
    let fb = FrameBuffer::new(config);

    for tick in 0..args.frames {
        if args.capture && tick % 10 == 0 {
            eprintln!("tick {tick}: still animating");
        }
        let lines = frame_lines(tick, args.frames, args.width);
        let grid = Grid::from_lines(&lines, args.width, lines.len() as u16);
        fb.render_frame(Frame::from_grid(grid));
        std::thread::sleep(Duration::from_millis(50));
    }

    fb.wait_for_pending_updates();
    fb.restore_cursor();
    fb.shutdown();
    Ok(())
}
