//! Interactive menu: update the data or browse a location.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use super::{
    load_dataset,
    status::availability,
    update,
    view::{render_day, render_table},
};
use crate::{config::Config, dataset::Dataset, store::Store};

#[derive(Debug, PartialEq, Eq)]
enum Choice {
    Update,
    View,
}

pub async fn menu(config: &Config, store: &Store) -> Result<String> {
    let mut dataset = load_dataset(store).await?;

    let choice = {
        let mut input = io::stdin().lock();
        let mut output = io::stdout().lock();
        prompt_choice(&mut input, &mut output)?
    };

    match choice {
        Choice::Update => {
            let message = update::apply(config, store, &mut dataset).await?;
            Ok(format!(
                "{}\n{}",
                message,
                availability(&dataset, &config.anchor_location)
            ))
        }
        Choice::View => {
            let mut input = io::stdin().lock();
            let mut output = io::stdout().lock();
            choose_location(&mut input, &mut output, &dataset)
        }
    }
}

fn prompt_choice<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Choice> {
    writeln!(output, "\nMENU:\n1. Update data\n2. View data\n")?;

    match prompt(input, output, "Enter choice (1/2): ")?.as_str() {
        "1" => Ok(Choice::Update),
        "2" => Ok(Choice::View),
        other => bail!("Invalid choice '{}'", other),
    }
}

/// Lists the stored locations and renders the one picked by number, either
/// in full or for a single date.
fn choose_location<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    dataset: &Dataset,
) -> Result<String> {
    if dataset.is_empty() {
        bail!("No data available");
    }

    let locations: Vec<&str> = dataset.locations().collect();

    writeln!(output, "\nWhat location would you like to view data for?")?;
    for (i, location) in locations.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, location)?;
    }

    let answer = prompt(input, output, "Enter choice: ")?;
    let index: usize = answer
        .parse()
        .with_context(|| format!("'{}' is not a number", answer))?;

    let location = index
        .checked_sub(1)
        .and_then(|i| locations.get(i))
        .with_context(|| format!("No location numbered {}", index))?;

    let history = dataset
        .get(location)
        .filter(|history| !history.is_empty())
        .with_context(|| format!("No data over this location, {}", location))?;

    let answer = prompt(input, output, "Enter date (YYYY-MM-DD, blank for all): ")?;
    if answer.is_empty() {
        return Ok(render_table(location, history));
    }

    let date = NaiveDate::parse_from_str(&answer, "%Y-%m-%d")
        .with_context(|| format!("'{}' is not a date", answer))?;
    let record = history
        .get(&date)
        .with_context(|| format!("No data for {} on {}", location, date))?;

    Ok(render_day(location, &date, record))
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("No input");
    }

    Ok(line.trim().to_string())
}

// -- Tests -------------------------------------------------------------------
