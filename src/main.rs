use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use mlb_prep::data::{loader, summary, writer};
use mlb_prep::features::{self, LabelEncoder};
use mlb_prep::impute::{self, FillReport};
use mlb_prep::FillConfig;

/// Input files of the standard task layout and the names their filled
/// copies get.
const BATCH_FILES: [(&str, &str); 3] = [
    ("task1/train_data.csv", "train_data.csv"),
    ("task1/same_season_test_data.csv", "task1_test_data.csv"),
    ("task2/2024_test_data.csv", "task2_test_data.csv"),
];

#[derive(Parser, Debug)]
#[command(
    name = "mlb-prep",
    version,
    about = "Fill missing values in baseball game tables and prepare model features"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill one table and write the result (.csv or .parquet)
    Fill {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        fill: FillArgs,
    },
    /// Fill the train and test tables of the standard task layout
    Batch {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        #[arg(long, default_value = "data_fill")]
        out_dir: PathBuf,
        #[command(flatten)]
        fill: FillArgs,
    },
    /// Build a classifier feature matrix from a filled table
    Features {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Team encoder: written with --train, read otherwise
        #[arg(long)]
        encoder: PathBuf,
        /// Fit the encoder and extract the home_team_win label
        #[arg(long)]
        train: bool,
        /// Add home-minus-away difference features
        #[arg(long)]
        diff: bool,
        /// Hold out this share of rows (rounded up) as a validation set
        #[arg(long, requires = "validation_output")]
        validation_share: Option<f64>,
        /// Where the held-out rows go
        #[arg(long, requires = "validation_share")]
        validation_output: Option<PathBuf>,
        /// Seed for the validation shuffle
        #[arg(long, default_value_t = 64)]
        split_seed: u64,
    },
    /// Print missing-value counts per column
    Summary { input: PathBuf },
}

#[derive(Args, Debug)]
struct FillArgs {
    /// JSON file overriding the default fill settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the night-game draws
    #[arg(long)]
    seed: Option<u64>,
}

impl FillArgs {
    fn resolve(&self) -> Result<FillConfig> {
        let mut config = match &self.config {
            Some(path) => FillConfig::from_path(path)?,
            None => FillConfig::default(),
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Fill {
            input,
            output,
            fill,
        } => fill_one(&input, &output, &fill.resolve()?),
        Command::Batch {
            data_dir,
            out_dir,
            fill,
        } => {
            let config = fill.resolve()?;
            for (source, target) in BATCH_FILES {
                fill_one(&data_dir.join(source), &out_dir.join(target), &config)?;
            }
            Ok(())
        }
        Command::Features {
            input,
            output,
            encoder,
            train,
            diff,
            validation_share,
            validation_output,
            split_seed,
        } => {
            let validation = validation_share
                .zip(validation_output)
                .map(|(share, path)| Validation {
                    share,
                    output: path,
                    seed: split_seed,
                });
            build_features(&input, &output, &encoder, train, diff, validation.as_ref())
        }
        Command::Summary { input } => print_summary(&input),
    }
}

fn fill_one(input: &Path, output: &Path, config: &FillConfig) -> Result<()> {
    let (table, report) = impute::load_and_fill(input, config)?;
    log_report(input, &report);
    writer::write_file(&table, output)
}

fn log_report(input: &Path, report: &FillReport) {
    let filled: usize = report.stats.iter().map(|(_, s)| s.filled).sum();
    let deferred: usize = report.stats.iter().map(|(_, s)| s.still_missing).sum();
    log::info!(
        "{}: {} unresolved seasons, {} team-stat gaps filled, {} deferred to means, {} columns dropped",
        input.display(),
        report.season.unresolved,
        filled,
        deferred,
        report.dropped.len()
    );
    for column in &report.means.all_missing {
        log::warn!("{}: column {column} is still empty", input.display());
    }
}

/// Held-out split requested on the `features` command.
#[derive(Debug)]
struct Validation {
    share: f64,
    output: PathBuf,
    seed: u64,
}

fn build_features(
    input: &Path,
    output: &Path,
    encoder_path: &Path,
    train: bool,
    diff: bool,
    validation: Option<&Validation>,
) -> Result<()> {
    let table = loader::load_file(input)?;
    let matrix = if train {
        let (matrix, encoder) =
            features::prepare_training(&table, diff).context("preparing training features")?;
        encoder.save(encoder_path)?;
        matrix
    } else {
        let encoder = LabelEncoder::load(encoder_path)?;
        features::prepare_inference(&table, &encoder, diff).context("preparing features")?
    };
    let matrix = match validation {
        Some(validation) => {
            if !(0.0..1.0).contains(&validation.share) {
                anyhow::bail!(
                    "validation share must be in [0, 1), got {}",
                    validation.share
                );
            }
            let (fit, held_out) = matrix.train_test_split(validation.share, validation.seed);
            held_out.write_csv(&validation.output)?;
            log::info!(
                "wrote {} validation rows to {}",
                held_out.n_rows(),
                validation.output.display()
            );
            fit
        }
        None => matrix,
    };
    matrix.write_csv(output)?;
    log::info!("wrote {} feature rows to {}", matrix.n_rows(), output.display());
    Ok(())
}

fn print_summary(input: &Path) -> Result<()> {
    let table = loader::load_file(input)?;
    println!(
        "{:<48} {:>8} {:>8} {:>8} {:>8}",
        "column", "type", "missing", "count", "percent"
    );
    for stat in summary::missing_report(&table) {
        println!(
            "{:<48} {:>8} {:>8} {:>8} {:>7.2}%",
            stat.column,
            stat.kind.to_string(),
            stat.any_missing(),
            stat.missing,
            stat.percentage
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAMES: &str = "id,home_team_abbr,away_team_abbr,date,is_night_game,home_team_win,season,home_runs_mean,away_runs_mean\n\
        1,NYY,BOS,2021-04-01,True,True,2021,4.0,3.0\n\
        2,BOS,NYY,2021-04-02,False,False,2021,3.5,4.5\n\
        3,NYY,BOS,2021-04-03,True,True,2021,5.0,2.0\n\
        4,BOS,NYY,2021-04-04,True,True,2021,4.0,4.0\n\
        5,NYY,BOS,2021-04-05,False,False,2021,3.0,3.5\n";

    fn data_rows(path: &Path) -> usize {
        std::fs::read_to_string(path).unwrap().lines().count() - 1
    }

    #[test]
    fn features_with_validation_split() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("games.csv");
        std::fs::write(&input, GAMES).unwrap();
        let output = dir.path().join("train.csv");
        let encoder = dir.path().join("encoder.json");
        let validation = Validation {
            share: 0.3,
            output: dir.path().join("valid.csv"),
            seed: 64,
        };

        build_features(&input, &output, &encoder, true, false, Some(&validation)).unwrap();

        // ceil(5 * 0.3) = 2 rows held out.
        assert_eq!(data_rows(&output), 3);
        assert_eq!(data_rows(&validation.output), 2);
        assert_eq!(LabelEncoder::load(&encoder).unwrap().classes(), &["BOS", "NYY"]);
    }

    #[test]
    fn features_without_split_keep_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("games.csv");
        std::fs::write(&input, GAMES).unwrap();
        let output = dir.path().join("train.csv");
        let encoder = dir.path().join("encoder.json");

        build_features(&input, &output, &encoder, true, false, None).unwrap();
        assert_eq!(data_rows(&output), 5);

        let inference = dir.path().join("test.csv");
        build_features(&input, &inference, &encoder, false, true, None).unwrap();
        assert_eq!(data_rows(&inference), 5);
    }

    #[test]
    fn out_of_range_share_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("games.csv");
        std::fs::write(&input, GAMES).unwrap();
        let validation = Validation {
            share: 1.5,
            output: dir.path().join("valid.csv"),
            seed: 1,
        };
        let result = build_features(
            &input,
            &dir.path().join("train.csv"),
            &dir.path().join("encoder.json"),
            true,
            false,
            Some(&validation),
        );
        assert!(result.is_err());
    }

    #[test]
    fn validation_flags_come_as_a_pair() {
        fn with(extra: &[&str]) -> std::result::Result<Cli, clap::Error> {
            let base = ["mlb-prep", "features", "in.csv", "-o", "out.csv", "--encoder", "enc.json"];
            let args: Vec<&str> = base.iter().chain(extra).copied().collect();
            Cli::try_parse_from(args)
        }
        assert!(with(&["--validation-share", "0.2"]).is_err());
        assert!(with(&["--validation-output", "valid.csv"]).is_err());

        let cli = with(&["--validation-share", "0.2", "--validation-output", "valid.csv"]).unwrap();
        match cli.command {
            Command::Features {
                validation_share,
                split_seed,
                ..
            } => {
                assert_eq!(validation_share, Some(0.2));
                assert_eq!(split_seed, 64);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
