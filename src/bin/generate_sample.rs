use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TEAMS: [&str; 6] = ["NYY", "BOS", "LAD", "SFG", "CHC", "STL"];
const SEASONS: [i32; 4] = [2020, 2021, 2022, 2023];
const GAMES_PER_SEASON: usize = 60;

/// (column suffix, centre, spread)
const STATS: [(&str, f64, f64); 4] = [
    ("batting_batting_avg_mean", 0.250, 0.015),
    ("batting_RBI_mean", 4.3, 0.6),
    ("pitching_earned_run_avg_mean", 4.1, 0.5),
    ("pitcher_earned_run_avg_mean", 4.0, 0.9),
];

/// Box-Muller transform for a normal draw.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// Empty with probability `p`, otherwise the value.
fn gap(rng: &mut StdRng, p: f64, value: String) -> String {
    if rng.gen_bool(p) {
        String::new()
    } else {
        value
    }
}

fn main() {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_games.csv".to_string());
    let mut rng = StdRng::seed_from_u64(42);

    // Per team-season offsets so same-season means differ between teams.
    let mut offsets = std::collections::HashMap::new();
    for team in TEAMS {
        for season in SEASONS {
            let offset: Vec<f64> = STATS
                .iter()
                .map(|&(_, _, spread)| gauss(&mut rng, 0.0, spread))
                .collect();
            offsets.insert((team, season), offset);
        }
    }

    let mut header: Vec<String> = [
        "id",
        "home_team_abbr",
        "away_team_abbr",
        "date",
        "is_night_game",
        "home_team_win",
        "home_pitcher",
        "away_pitcher",
        "home_team_season",
        "away_team_season",
        "season",
        "home_team_rest",
        "away_team_rest",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for side in ["home", "away"] {
        for (suffix, _, _) in STATS {
            header.push(format!("{side}_{suffix}"));
        }
    }

    let mut writer = csv::Writer::from_path(&output_path).expect("Failed to create output file");
    writer.write_record(&header).expect("Failed to write header");

    let mut id = 0usize;
    for season in SEASONS {
        let opening_day = NaiveDate::from_ymd_opt(season, 4, 1).expect("valid opening day");
        for game in 0..GAMES_PER_SEASON {
            let home = TEAMS[rng.gen_range(0..TEAMS.len())];
            let away = loop {
                let t = TEAMS[rng.gen_range(0..TEAMS.len())];
                if t != home {
                    break t;
                }
            };
            let date = opening_day + Duration::days((game * 3) as i64);

            let night = if rng.gen_bool(0.6) { "True" } else { "False" };
            let home_win = if rng.gen_bool(0.53) { "True" } else { "False" };
            let home_pitcher = format!("{home}_SP{}", rng.gen_range(1..=5));
            let away_pitcher = format!("{away}_SP{}", rng.gen_range(1..=5));
            let home_rest = rng.gen_range(0..4).to_string();
            let away_rest = rng.gen_range(0..4).to_string();

            let mut record = vec![
                id.to_string(),
                home.to_string(),
                away.to_string(),
                gap(&mut rng, 0.5, date.format("%Y-%m-%d").to_string()),
                gap(&mut rng, 0.1, night.to_string()),
                home_win.to_string(),
                home_pitcher,
                away_pitcher,
                gap(&mut rng, 0.2, format!("{home}_{season}")),
                gap(&mut rng, 0.2, format!("{away}_{season}")),
                gap(&mut rng, 0.3, season.to_string()),
                gap(&mut rng, 0.05, home_rest),
                gap(&mut rng, 0.05, away_rest),
            ];
            for team in [home, away] {
                for (i, &(_, centre, spread)) in STATS.iter().enumerate() {
                    let noise = gauss(&mut rng, 0.0, spread / 4.0);
                    let value = centre + offsets[&(team, season)][i] + noise;
                    record.push(gap(&mut rng, 0.1, format!("{value:.4}")));
                }
            }

            writer.write_record(&record).expect("Failed to write row");
            id += 1;
        }
    }
    writer.flush().expect("Failed to flush output");

    println!("Wrote {id} games to {output_path}");
}
