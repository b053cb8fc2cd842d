use anyhow::Result;
use skyglance_core::Config;
use skyglance_ui::input::HELP;
use skyglance_ui::{render, AppServices, Input, RenderOptions, WeatherController};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    skyglance_core::init()?;

    let config = Config::load_validated()?;
    let services = AppServices::from_config(&config)?;
    let options = RenderOptions::from(&config.ui);

    tracing::info!("SkyGlance started");

    let mut controller = WeatherController::new(services);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    redraw(&controller, &options);

    // Once stdin closes the screen keeps updating until Ctrl-C.
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = controller.next_update() => {
                if changed {
                    redraw(&controller, &options);
                }
            }
            line = lines.next_line(), if stdin_open => {
                match LineAction::from_line(line?.as_deref()) {
                    LineAction::EndOfInput => {
                        tracing::debug!("stdin closed, waiting for Ctrl-C");
                        stdin_open = false;
                    }
                    LineAction::Run(Input::Refresh) => {
                        if controller.refresh() {
                            redraw(&controller, &options);
                        }
                    }
                    LineAction::Run(Input::Retry) => {
                        if controller.retry_permission() {
                            redraw(&controller, &options);
                        }
                    }
                    LineAction::Run(Input::Quit) => break,
                    LineAction::Help => println!("{}", HELP),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    controller.shutdown();
    tracing::info!("SkyGlance stopped");
    Ok(())
}

fn redraw(controller: &WeatherController, options: &RenderOptions) {
    println!("\n{}\n", render(controller.screen(), options));
}

/// What one read from stdin asks for. `None` means stdin is closed.
#[derive(Debug, PartialEq, Eq)]
enum LineAction {
    EndOfInput,
    Run(Input),
    Help,
}

impl LineAction {
    fn from_line(line: Option<&str>) -> Self {
        match line {
            None => Self::EndOfInput,
            Some(line) => Input::parse(line).map_or(Self::Help, Self::Run),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_stdin_does_not_quit() {
        assert_eq!(LineAction::from_line(None), LineAction::EndOfInput);
        assert_ne!(LineAction::from_line(None), LineAction::Run(Input::Quit));
    }

    #[test]
    fn lines_map_to_inputs() {
        assert_eq!(LineAction::from_line(Some("q")), LineAction::Run(Input::Quit));
        assert_eq!(LineAction::from_line(Some("r\n")), LineAction::Run(Input::Refresh));
        assert_eq!(LineAction::from_line(Some("what")), LineAction::Help);
    }
}
