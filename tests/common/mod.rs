//! Synthetic calorie tables written to a temporary directory

#![allow(dead_code)]

use calorie_burn::config::DataSources;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Calories rise with duration and with heart rate above rest
pub fn synthetic_calories(duration: f64, heart_rate: f64, weight: f64) -> f64 {
    duration * (heart_rate - 60.0) / 10.0 + weight / 20.0
}

pub struct Fixture {
    pub dir: TempDir,
    pub sources: DataSources,
}

impl Fixture {
    pub fn exercise_path(&self) -> PathBuf {
        self.sources.exercise.clone()
    }

    pub fn calories_path(&self) -> PathBuf {
        self.sources.calories.clone()
    }
}

/// Write `rows` matching exercise/calories rows with a header each
pub fn write_tables(rows: usize, seed: u64) -> Fixture {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut exercise = String::from("User_ID,Gender,Age,Height,Weight,Duration,Heart_Rate,Body_Temp\n");
    let mut calories = String::from("User_ID,Calories\n");

    for i in 0..rows {
        let id = 10_000_000 + i;
        let gender = if rng.gen_bool(0.5) { "male" } else { "female" };
        let age = rng.gen_range(20..=79);
        let height = rng.gen_range(150..=200);
        let weight = rng.gen_range(50..=110);
        let duration = rng.gen_range(5..=30);
        let heart_rate = rng.gen_range(70..=130);
        let body_temp = 39.0 + rng.gen_range(0..=20) as f64 / 10.0;
        let kcal = synthetic_calories(duration as f64, heart_rate as f64, weight as f64);

        exercise.push_str(&format!(
            "{id},{gender},{age},{height}.0,{weight}.0,{duration}.0,{heart_rate}.0,{body_temp:.1}\n"
        ));
        calories.push_str(&format!("{id},{kcal:.1}\n"));
    }

    write_raw(&exercise, &calories)
}

/// Write the two tables verbatim
pub fn write_raw(exercise: &str, calories: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let exercise_path = dir.path().join("exercise.csv");
    let calories_path = dir.path().join("calories.csv");

    fs::File::create(&exercise_path)
        .unwrap()
        .write_all(exercise.as_bytes())
        .unwrap();
    fs::File::create(&calories_path)
        .unwrap()
        .write_all(calories.as_bytes())
        .unwrap();

    Fixture {
        sources: DataSources::new(exercise_path, calories_path),
        dir,
    }
}
