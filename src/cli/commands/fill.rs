use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use rand::Rng;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::database::models::KingdomInput;
use crate::database::KingdomRepository;

pub const STATE_CONFIRMED: &str = "Data confirmed";
pub const STATE_LOST: &str = "Data lost";

const PREFIXES: &[&str] = &[
    "First", "Second", "Third", "Fourth", "Fifth", "Sixth", "Seventh", "Eighth", "Ninth", "Tenth",
    "Eleventh", "Great", "Almighty", "Beautiful", "Wealthy", "Island", "Agrarian", "Desert",
    "United", "Urban", "Rural",
];

const KINDS: &[&str] = &["State", "Principality", "Tsardom", "Kingdom", "Dominion", "Union"];

const SYLLABLES: &[&str] = &[
    "ar", "bel", "cor", "dun", "el", "fen", "gar", "hal", "is", "kor", "lin", "mor", "nor", "os",
    "par", "quel", "ros", "sil", "tor", "ul", "var", "wyn", "yor", "zan",
];

/// Largest generated area, exclusive.
const MAX_AREA: i32 = 100_000;

#[derive(Args)]
pub struct FillArgs {
    #[arg(long, help = "Number of kingdoms to generate", default_value_t = 200)]
    pub count: usize,

    #[arg(long, help = "File with base64 image data stored on every generated kingdom")]
    pub image: Option<PathBuf>,
}

pub async fn handle(args: FillArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let image = match &args.image {
        Some(path) => load_image(path).await?,
        None => String::new(),
    };
    let kingdoms = generate(&mut rand::rng(), args.count, &image);

    let repo = KingdomRepository::new(utils::pool()?);
    let inserted = repo.insert_many(&kingdoms).await?;
    let skipped = kingdoms.len() as u64 - inserted;

    utils::output_success(
        output_format,
        &format!("Inserted {} kingdoms ({} already existed)", inserted, skipped),
        Some(json!({ "inserted": inserted, "skipped": skipped })),
    )
}

/// Reads base64 image data, dropping surrounding whitespace.
pub async fn load_image(path: &Path) -> anyhow::Result<String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read image file {}", path.display()))?;
    Ok(raw.trim().to_string())
}

fn pick<'a, R: Rng>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words[rng.random_range(0..words.len())]
}

fn capital<R: Rng>(rng: &mut R) -> String {
    let parts = rng.random_range(2..=3);
    let raw: String = (0..parts).map(|_| pick(rng, SYLLABLES)).collect();

    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => raw,
    }
}

fn state<R: Rng>(rng: &mut R) -> &'static str {
    if rng.random_range(0..10) < 9 {
        STATE_CONFIRMED
    } else {
        STATE_LOST
    }
}

/// Generates up to `count` kingdoms with distinct names.
pub fn generate<R: Rng>(rng: &mut R, count: usize, image: &str) -> Vec<KingdomInput> {
    let mut names = HashSet::with_capacity(count);
    let mut kingdoms = Vec::with_capacity(count);
    let max_attempts = count.saturating_mul(20).max(100);

    for _ in 0..max_attempts {
        if kingdoms.len() == count {
            break;
        }

        let capital = capital(rng);
        let name = format!("{} {} {}", pick(rng, PREFIXES), capital, pick(rng, KINDS));
        if name.chars().count() > 100 || !names.insert(name.clone()) {
            continue;
        }

        let area = rng.random_range(1..MAX_AREA);
        kingdoms.push(KingdomInput {
            description: format!("{} covers {} square miles, its capital is {}.", name, area, capital),
            name,
            area,
            capital,
            image: image.to_string(),
            state: state(rng).to_string(),
        });
    }

    kingdoms
}
