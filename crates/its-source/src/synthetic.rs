//! Deterministic synthetic identity source.
//!
//! Given the same ID this source always produces byte-identical records,
//! so demo environments and tests are reproducible without a registry
//! deployment. All derivation is pure arithmetic over the ID digits;
//! there is no RNG state and no network.

use async_trait::async_trait;

use its_model::{IdentityRecord, ItsId};

use crate::error::{SourceError, SourceResult};
use crate::source::IdentitySource;

const FIRST_NAMES: &[&str] = &[
    "Aisha", "Bilal", "Daniyal", "Fatima", "Hamza", "Ibrahim", "Khadija", "Maryam", "Mustafa",
    "Nadia", "Omar", "Rashid", "Safia", "Tariq", "Yusuf", "Zainab",
];

const LAST_NAMES: &[&str] = &[
    "Ahmad", "Baig", "Chaudhry", "Dar", "Hashmi", "Iqbal", "Javed", "Khan", "Malik", "Mirza",
    "Qureshi", "Rahman", "Sheikh", "Siddiqui", "Tahir", "Zafar",
];

const OCCUPATIONS: &[&str] = &[
    "Doctor", "Teacher", "Engineer", "Accountant", "Trader", "Farmer", "Nurse", "Student",
];

const CATEGORIES: &[&str] = &[
    "Amil", "Member", "Associate", "Veteran", "Youth", "Senior", "Supporter", "Volunteer",
];

const NATIONALITIES: &[&str] = &[
    "British", "Canadian", "German", "Ghanaian", "Indian", "Nigerian", "Pakistani", "American",
];

const STREETS: &[&str] = &[
    "Elm St", "Oak Ave", "Maple Rd", "Cedar Ln", "Birch Way", "Willow Dr", "Aspen Ct", "Pine Blvd",
];

const CITIES: &[&str] = &[
    "Springfield", "Riverton", "Lakewood", "Fairview", "Brookside", "Hillcrest", "Westfield",
    "Easton",
];

/// ID suffix with no record, so missing-record paths can be exercised
/// deterministically in development.
const ABSENT_SUFFIX: &str = "99";

/// Deterministic in-process identity source.
#[derive(Debug, Clone)]
pub struct SyntheticIdentitySource {
    min_secret_len: usize,
}

impl SyntheticIdentitySource {
    /// Creates a synthetic source with the given credential length
    /// policy.
    #[must_use]
    pub const fn new(min_secret_len: usize) -> Self {
        Self { min_secret_len }
    }

    /// Derives the record for an ID. Pure: the same ID always yields
    /// field-for-field identical output.
    #[must_use]
    pub fn record_for(&self, id: &ItsId) -> IdentityRecord {
        let mut state = fnv1a64(id.digits());

        let first_name = pick(&mut state, FIRST_NAMES);
        let middle_name = if mix(&mut state) % 3 == 0 {
            Some(pick(&mut state, FIRST_NAMES).to_string())
        } else {
            None
        };
        let last_name = pick(&mut state, LAST_NAMES);
        let occupation = pick(&mut state, OCCUPATIONS);
        let category = pick(&mut state, CATEGORIES);
        let nationality = pick(&mut state, NATIONALITIES);
        let street_no = mix(&mut state) % 980 + 1;
        let street = pick(&mut state, STREETS);
        let city = pick(&mut state, CITIES);
        let phone = format!("+1-555-{:04}", mix(&mut state) % 10_000);

        IdentityRecord {
            id: id.clone(),
            first_name: first_name.to_string(),
            middle_name,
            last_name: last_name.to_string(),
            email: format!(
                "{}.{}.{}@its.example.org",
                first_name.to_ascii_lowercase(),
                last_name.to_ascii_lowercase(),
                id
            ),
            phone,
            occupation: occupation.to_string(),
            category: category.to_string(),
            address: format!("{street_no} {street}, {city}"),
            nationality: nationality.to_string(),
            photo_ref: format!("photos/{id}.jpg"),
        }
    }

    fn exists(id: &ItsId) -> bool {
        !id.as_str().ends_with(ABSENT_SUFFIX)
    }
}

#[async_trait]
impl IdentitySource for SyntheticIdentitySource {
    fn kind(&self) -> &'static str {
        "synthetic"
    }

    async fn fetch(&self, id: &ItsId) -> SourceResult<IdentityRecord> {
        if Self::exists(id) {
            Ok(self.record_for(id))
        } else {
            Err(SourceError::NotFound(id.clone()))
        }
    }

    async fn search(&self, query: &str) -> SourceResult<Vec<IdentityRecord>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        // A deterministic page of ids derived from the query text.
        let mut state = fnv1a64(query.trim().as_bytes());
        let count = (mix(&mut state) % 4 + 1) as usize;

        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            let mut n = mix(&mut state) % 100_000_000;
            if n % 100 == 99 {
                n -= 1;
            }
            let id = ItsId::new(format!("{n:08}"))
                .map_err(|e| SourceError::validation(e.to_string()))?;
            results.push(self.record_for(&id));
        }
        Ok(results)
    }

    async fn validate_credentials(&self, _id: &ItsId, secret: &str) -> SourceResult<bool> {
        // Development convenience: any secret meeting the length policy.
        Ok(secret.chars().count() >= self.min_secret_len)
    }
}

/// FNV-1a over the ID digits; the stable per-ID seed.
fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// splitmix64 step; advances the state and returns the next value.
fn mix(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn pick<'a>(state: &mut u64, table: &[&'a str]) -> &'a str {
    table[(mix(state) % table.len() as u64) as usize]
}
