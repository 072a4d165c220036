//! Interactive prediction form and menu

use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use super::{dim, render, section, Session};
use crate::data::input::{AGE, BODY_TEMP, DURATION, HEART_RATE, HEIGHT, WEIGHT};
use crate::data::{ExerciseInput, FieldBounds, Gender};

fn print_banner() {
    println!();
    println!("       {}", "Calorie Burn Predictor".truecolor(255, 140, 90).bold());
    println!(
        "       {}",
        dim(&format!("gradient-boosted trees  ·  v{}", env!("CARGO_PKG_VERSION")))
    );
    println!();
}

fn wait_enter() {
    println!();
    println!("  {}", dim("press enter to continue"));
    let mut input = String::new();
    let _ = std::io::stdin().read_line(&mut input);
}

fn theme() -> ColorfulTheme {
    ColorfulTheme {
        active_item_prefix: dialoguer::console::style("  ›".to_string()).for_stderr().cyan(),
        active_item_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        inactive_item_prefix: dialoguer::console::style("   ".to_string()).for_stderr(),
        inactive_item_style: dialoguer::console::Style::new().for_stderr().color256(245),
        prompt_prefix: dialoguer::console::style("  ?".to_string()).for_stderr().color256(209),
        prompt_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        ..ColorfulTheme::default()
    }
}

fn prompt_field(theme: &ColorfulTheme, bounds: FieldBounds, current: f64) -> anyhow::Result<f64> {
    let value = Input::<f64>::with_theme(theme)
        .with_prompt(format!("{} [{}–{}]", bounds.label, bounds.min, bounds.max))
        .default(current)
        .validate_with(move |v: &f64| -> Result<(), String> {
            if bounds.contains(*v) {
                Ok(())
            } else {
                Err(format!("enter a value between {} and {}", bounds.min, bounds.max))
            }
        })
        .interact_text()?;
    Ok(value)
}

/// Fill the prediction form, starting from the previous answers
fn prompt_input(
    theme: &ColorfulTheme,
    previous: &ExerciseInput,
) -> anyhow::Result<Option<ExerciseInput>> {
    let genders = [Gender::Male, Gender::Female];
    let labels: Vec<&str> = genders.iter().map(|g| g.as_str()).collect();
    let default = genders.iter().position(|g| *g == previous.gender).unwrap_or(0);

    let Some(idx) = Select::with_theme(theme)
        .with_prompt("Gender")
        .items(&labels)
        .default(default)
        .interact_opt()?
    else {
        return Ok(None);
    };

    Ok(Some(ExerciseInput {
        gender: genders[idx],
        age: prompt_field(theme, AGE, previous.age)?,
        height: prompt_field(theme, HEIGHT, previous.height)?,
        weight: prompt_field(theme, WEIGHT, previous.weight)?,
        duration: prompt_field(theme, DURATION, previous.duration)?,
        heart_rate: prompt_field(theme, HEART_RATE, previous.heart_rate)?,
        body_temp: prompt_field(theme, BODY_TEMP, previous.body_temp)?,
    }))
}

pub fn cmd_interactive(session: &Session) -> anyhow::Result<()> {
    print_banner();

    let context = session.build(false)?;
    let theme = theme();
    let mut last = ExerciseInput::default();

    loop {
        let items = &[
            "Predict               estimate calories for a session",
            "Data Report           preview, summary & distributions",
            "Model Performance     R² and mean absolute error",
            "Exit",
        ];

        println!();
        let sel = Select::with_theme(&theme)
            .with_prompt("What would you like to do")
            .items(items)
            .default(0)
            .interact_opt()?;

        match sel {
            Some(0) => {
                section("Exercise Details");
                if let Some(input) = prompt_input(&theme, &last)? {
                    let estimate = context.predict_input(&input)?;
                    render::estimate(&input, estimate);
                    last = input;
                }
            }
            Some(1) => {
                render::dataset_report(&context.dataset, 5, 12)?;
                wait_enter();
            }
            Some(2) => {
                section("Model Performance");
                render::metrics(&context.metrics);
                wait_enter();
            }
            Some(3) | None => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                break;
            }
            _ => {}
        }
    }

    Ok(())
}
