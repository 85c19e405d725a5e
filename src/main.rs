#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}

// In the browser the crate is driven through `web::mount`.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::{env, fs::File, io::stdout};

    use anyhow::{Context, Result};
    use crossterm::{
        event::{DisableMouseCapture, EnableMouseCapture},
        execute,
        terminal::{
            EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size,
        },
    };
    use log::{error, info};
    use ratatui::{Terminal, backend::CrosstermBackend};
    use simplelog::{LevelFilter, WriteLogger};

    use floating_toc::TocConfig;
    use floating_toc::panic_handler;
    use floating_toc::terminal::event_source::KeyboardEventSource;
    use floating_toc::terminal::{App, Document, TerminalPage, run_app_with_event_source};

    const USAGE: &str = "Usage: floating-toc [--config <file>] [--path <page-path>] [--fragment <id>] [document]";

    #[derive(Debug, Default)]
    struct Args {
        config: Option<String>,
        path: Option<String>,
        fragment: Option<String>,
        document: Option<String>,
    }

    fn parse_args(raw: Vec<String>) -> Result<Args> {
        let mut args = Args::default();
        let mut iter = raw.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => args.config = Some(iter.next().context(USAGE)?),
                "--path" => args.path = Some(iter.next().context(USAGE)?),
                "--fragment" => {
                    let fragment = iter.next().context(USAGE)?;
                    args.fragment = Some(fragment.trim_start_matches('#').to_string());
                }
                "-h" | "--help" => anyhow::bail!(USAGE),
                other if other.starts_with("--") => {
                    anyhow::bail!("Unknown option {other}\n{USAGE}")
                }
                _ => args.document = Some(arg),
            }
        }
        Ok(args)
    }

    pub fn run() -> Result<()> {
        WriteLogger::init(
            LevelFilter::Debug,
            simplelog::ConfigBuilder::new()
                .set_max_level(LevelFilter::Debug)
                .build(),
            File::create("floating-toc.log")?,
        )?;

        let args = parse_args(env::args().skip(1).collect())?;
        let config = TocConfig::load_or_default(args.config.as_deref(), TocConfig::terminal());
        let document = match &args.document {
            Some(path) => Document::load(path)?,
            None => Document::sample(),
        };

        panic_handler::initialize_panic_handler();

        info!(
            "Starting floating-toc with {} sections",
            document.sections.len()
        );

        enable_raw_mode().map_err(|e| {
            error!("Failed to enable raw mode: {e}");
            anyhow::anyhow!(
                "Failed to initialize terminal: {e}\n\
                 Make sure you are running floating-toc in a terminal, not from a pipe or redirection."
            )
        })?;
        let mut stdout = stdout();

        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|e| {
            error!("Failed to setup terminal: {e}");
            let _ = disable_raw_mode();
            anyhow::anyhow!("Failed to setup terminal: {e}")
        })?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let (width, height) = size().unwrap_or((80, 24));
        let mut page = TerminalPage::new(document, width, height).with_fragment(args.fragment);
        if let Some(path) = &args.path {
            page = page.with_path(path);
        }

        let mut app = App::new(page, config);
        app.start();
        let mut event_source = KeyboardEventSource;
        let res = run_app_with_event_source(&mut terminal, &mut app, &mut event_source);

        let _ = disable_raw_mode();
        let _ = execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = terminal.show_cursor();

        if let Err(err) = res {
            error!("Application error: {err:?}");
            println!("{err:?}");
        }

        info!("Shutting down floating-toc");
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn strings(args: &[&str]) -> Vec<String> {
            args.iter().map(|a| a.to_string()).collect()
        }

        #[test]
        fn test_parse_args() {
            let args = parse_args(strings(&[
                "--fragment",
                "#history",
                "--path",
                "/publications.html",
                "page.md",
            ]))
            .unwrap();
            assert_eq!(args.fragment.as_deref(), Some("history"));
            assert_eq!(args.path.as_deref(), Some("/publications.html"));
            assert_eq!(args.document.as_deref(), Some("page.md"));
            assert!(args.config.is_none());
        }

        #[test]
        fn test_parse_args_rejects_unknown_and_incomplete() {
            assert!(parse_args(strings(&["--verbose"])).is_err());
            assert!(parse_args(strings(&["--config"])).is_err());
        }
    }
}
