use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{InquireError, Select};
use skyboard_core::{Config, DISTRICTS, Dashboard, Renderer, WeatherRecord};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyboard", version, about = "Current weather for Hong Kong districts and any city")]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up current conditions for any city by name.
    Search {
        /// City name, e.g. `Berlin` or `New York`.
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Refresh Hong Kong Observatory data and show one district.
    Regional {
        /// District to show; defaults to the configured one.
        #[arg(short, long)]
        district: Option<String>,

        /// Keep prompting for districts, re-rendering from the fetched data.
        #[arg(short, long)]
        interactive: bool,
    },

    /// List the selectable districts.
    Districts,

    /// Choose the default district and save it to the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let renderer = Renderer::from_config(&config);
        let mut dash = Dashboard::from_config(&config);

        match self.command {
            Command::Search { city } => {
                let record = dash
                    .search_city(&city.join(" "))
                    .await
                    .context("Error fetching weather data")?;
                show(&renderer, &record);
            }
            Command::Regional { district, interactive } => {
                if let Some(district) = district {
                    dash.select_district(&district)?;
                }

                let record = dash.refresh_regional().await.context("Error fetching weather data")?;
                show(&renderer, &record);

                if interactive {
                    browse_districts(&mut dash, &renderer)?;
                }
            }
            Command::Districts => {
                for name in dash.districts() {
                    println!("{name}");
                }
            }
            Command::Configure => configure(config)?,
        }

        Ok(())
    }
}

fn show(renderer: &Renderer, record: &WeatherRecord) {
    print!("{}", renderer.render(record));
}

/// Prompt for districts until the user cancels. Every pick is answered from
/// the snapshot fetched by the preceding refresh.
fn browse_districts(dash: &mut Dashboard, renderer: &Renderer) -> anyhow::Result<()> {
    loop {
        let cursor = cursor_for(dash.selected_district());
        let choice = match Select::new("District:", DISTRICTS.to_vec())
            .with_starting_cursor(cursor)
            .with_help_message("Esc to quit")
            .prompt()
        {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(err) => return Err(err).context("District prompt failed"),
        };

        match dash.select_district(choice).context("Error updating district")? {
            Some(record) => {
                println!();
                show(renderer, &record);
            }
            None => println!("No regional data loaded yet."),
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let cursor = cursor_for(&config.display.default_district);
    let choice = Select::new("Default district:", DISTRICTS.to_vec())
        .with_starting_cursor(cursor)
        .prompt()
        .context("District prompt failed")?;

    config.set_default_district(choice)?;
    config.save()?;

    println!("Default district set to {choice}.");
    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn cursor_for(district: &str) -> usize {
    DISTRICTS.iter().position(|d| *d == district).unwrap_or(0)
}
