//! Seeded generator for OCR text of the front of a Chilean identity card.
//!
//! Every card carries exactly one checksum-valid RUN behind a `RUN` or `RUT`
//! label, a document serial directly after `NÚMERO DOCUMENTO`, a block of
//! filler lines and, optionally, RUN-shaped decoys whose check digit is
//! wrong. The planted RUN is always the value extraction should return.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use runscan_core::expected_check_char;

const CHECK_CHARS: &[u8] = b"0123456789K";

const MONTHS: &[&str] = &[
    "ENE", "FEB", "MAR", "ABR", "MAY", "JUN", "JUL", "AGO", "SEP", "OCT", "NOV", "DIC",
];

const FILLER_WORDS: &[&str] = &[
    "APELLIDOS",
    "NOMBRES",
    "NACIONALIDAD",
    "CHILENA",
    "SEXO",
    "FECHA",
    "NACIMIENTO",
    "FIRMA",
    "TITULAR",
    "SOTO",
    "ROJAS",
    "MARIA",
    "JOSE",
    "LAGOS",
    "MENA",
    "PEDRO",
    "ANDRES",
    "IDENTIFICACION",
];

/// Configuration for a generated card set.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// RNG seed; equal configs always yield identical cards.
    pub seed: u64,
    /// Number of cards to generate.
    pub num_cards: usize,
    /// Filler lines above the document serial.
    pub noise_lines: usize,
    /// RUN-shaped strings with a wrong check digit mixed into the filler.
    pub num_decoys: usize,
    /// Probability that the document serial has a valid check digit.
    pub valid_serial_ratio: f64,
    /// Probability that a card is emitted entirely in lowercase.
    pub lowercase_ratio: f64,
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// A clean scan: a handful of lines and no decoys.
    Small,
    /// A noisy scan with some decoys.
    Medium,
    /// A very long text, roughly a multi-page dump.
    Large,
}

impl SizeTier {
    /// Returns the generator configuration for this tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        match self {
            SizeTier::Small => GeneratorConfig {
                seed,
                num_cards: 100,
                noise_lines: 4,
                num_decoys: 0,
                valid_serial_ratio: 0.5,
                lowercase_ratio: 0.0,
            },
            SizeTier::Medium => GeneratorConfig {
                seed,
                num_cards: 100,
                noise_lines: 40,
                num_decoys: 5,
                valid_serial_ratio: 0.5,
                lowercase_ratio: 0.2,
            },
            SizeTier::Large => GeneratorConfig {
                seed,
                num_cards: 20,
                noise_lines: 1000,
                num_decoys: 50,
                valid_serial_ratio: 0.5,
                lowercase_ratio: 0.2,
            },
        }
    }
}

/// One generated card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticCard {
    /// The OCR text.
    pub text: String,
    /// The planted RUN in canonical dotted form, uppercase.
    pub planted: String,
    /// The document serial as written on the card.
    pub serial: String,
}

/// Generates `config.num_cards` cards from `config.seed`.
pub fn generate_cards(config: &GeneratorConfig) -> Vec<SyntheticCard> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    (0..config.num_cards)
        .map(|_| build_card(config, &mut rng))
        .collect()
}

/// Generates a single card from `config.seed`, ignoring `num_cards`.
pub fn generate_card(config: &GeneratorConfig) -> SyntheticCard {
    let mut rng = StdRng::seed_from_u64(config.seed);
    build_card(config, &mut rng)
}

fn build_card(config: &GeneratorConfig, rng: &mut StdRng) -> SyntheticCard {
    let planted = valid_run(rng);
    let serial = if rng.gen_bool(config.valid_serial_ratio) {
        valid_run(rng)
    } else {
        invalid_run(rng)
    };

    let mut lines: Vec<String> = vec![
        "REPUBLICA DE CHILE".to_owned(),
        "SERVICIO DE REGISTRO CIVIL E IDENTIFICACION".to_owned(),
        "CEDULA DE IDENTIDAD".to_owned(),
    ];
    let mut decoys_left = config.num_decoys;
    for i in 0..config.noise_lines {
        // Spread decoys evenly over the filler; leftovers go at the end.
        let slots_left = config.noise_lines - i;
        if decoys_left > 0 && rng.gen_range(0..slots_left) < decoys_left {
            lines.push(format!("LOTE {}", invalid_run(rng)));
            decoys_left -= 1;
        } else {
            lines.push(filler_line(rng));
        }
    }
    for _ in 0..decoys_left {
        lines.push(format!("LOTE {}", invalid_run(rng)));
    }

    lines.push(format!("NÚMERO DOCUMENTO {serial}"));
    lines.push(format!("FECHA DE EMISIÓN {}", date(rng, 2015..2024)));
    lines.push(format!("FECHA DE VENCIMIENTO {}", date(rng, 2025..2035)));
    let label = if rng.gen_bool(0.5) { "RUN" } else { "RUT" };
    lines.push(format!("{label} {planted}"));
    lines.push(format!(
        "INCHL{}<<<<<<<<<<",
        planted.replace(['.', '-'], "")
    ));

    let mut text = lines.join("\n");
    text.push('\n');
    if rng.gen_bool(config.lowercase_ratio) {
        text = text.to_lowercase();
    }

    SyntheticCard {
        text,
        planted,
        serial,
    }
}

fn filler_line(rng: &mut StdRng) -> String {
    let words = rng.gen_range(1..=5);
    (0..words)
        .map(|_| FILLER_WORDS[rng.gen_range(0..FILLER_WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

fn date(rng: &mut StdRng, years: std::ops::Range<u32>) -> String {
    let day = rng.gen_range(1..=28);
    let month = MONTHS[rng.gen_range(0..MONTHS.len())];
    let year = rng.gen_range(years);
    format!("{day:02} {month} {year}")
}

fn random_body(rng: &mut StdRng) -> u32 {
    rng.gen_range(1_000_000..30_000_000)
}

/// Returns a dotted RUN with the correct check character.
fn valid_run(rng: &mut StdRng) -> String {
    let body = random_body(rng);
    // A decimal rendering of a u32 is always a valid body.
    let check = expected_check_char(&body.to_string()).unwrap_or('0');
    dotted(body, check)
}

/// Returns a dotted RUN whose check character is guaranteed wrong.
fn invalid_run(rng: &mut StdRng) -> String {
    let body = random_body(rng);
    let right = expected_check_char(&body.to_string()).unwrap_or('0');
    let wrong = loop {
        let c = CHECK_CHARS[rng.gen_range(0..CHECK_CHARS.len())] as char;
        if c != right {
            break c;
        }
    };
    dotted(body, wrong)
}

fn dotted(body: u32, check: char) -> String {
    format!(
        "{}.{:03}.{:03}-{check}",
        body / 1_000_000,
        (body / 1_000) % 1_000,
        body % 1_000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_pads_groups() {
        assert_eq!(dotted(7_000_013, 'K'), "7.000.013-K");
        assert_eq!(dotted(12_345_678, '5'), "12.345.678-5");
    }

    #[test]
    fn decoy_count_is_honoured() {
        let config = GeneratorConfig {
            seed: 3,
            num_cards: 1,
            noise_lines: 10,
            num_decoys: 4,
            valid_serial_ratio: 0.0,
            lowercase_ratio: 0.0,
        };
        let card = generate_card(&config);
        assert_eq!(card.text.matches("LOTE ").count(), 4);
    }

    #[test]
    fn more_decoys_than_filler_lines_are_appended() {
        let config = GeneratorConfig {
            seed: 3,
            num_cards: 1,
            noise_lines: 1,
            num_decoys: 3,
            valid_serial_ratio: 0.0,
            lowercase_ratio: 0.0,
        };
        let card = generate_card(&config);
        assert_eq!(card.text.matches("LOTE ").count(), 3);
    }
}
