//! Demo dataset: fake company records for the `browse` shell.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::error::PagewiseError;
use crate::source::Searchable;

/// Industries a generated company can belong to.
pub const INDUSTRIES: [&str; 10] = [
    "Technology",
    "Healthcare",
    "Finance",
    "E-commerce",
    "Manufacturing",
    "Education",
    "Real Estate",
    "Transportation",
    "Energy",
    "Media",
];

const NAME_PREFIXES: [&str; 30] = [
    "Tech", "Data", "Cloud", "Quantum", "Nexus", "Alpha", "Stellar", "Cyber", "Velocity",
    "Prisma", "Zenith", "Blue", "Innova", "Sky", "Meta", "Titan", "Epsilon", "Phoenix", "Omega",
    "Apex", "Digital", "Smart", "Future", "Global", "Prime", "Elite", "Advanced", "Dynamic",
    "Rapid", "Ultra",
];

const NAME_MIDDLES: [&str; 20] = [
    "Flow", "Stream", "Vision", "Leap", "Point", "Wave", "Bridge", "Force", "Drive", "Rise",
    "Core", "Print", "Sphere", "Link", "Net", "Hub", "Lab", "Works", "Systems", "Solutions",
];

const NAME_SUFFIXES: [&str; 16] = [
    "Solutions",
    "Corp",
    "Inc",
    "Technologies",
    "Systems",
    "Dynamics",
    "Innovations",
    "Labs",
    "Networks",
    "Analytics",
    "Ventures",
    "Co",
    "Group",
    "Industries",
    "Services",
    "Enterprises",
];

const DOMAINS: [&str; 5] = [".com", ".io", ".net", ".tech", ".co"];

const DESCRIPTION: &str =
    "Leading provider of innovative technology solutions for modern businesses.";

/// Subscription tier of a company account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionTier {
    Free,
    Starter,
    Professional,
}

impl SubscriptionTier {
    pub const ALL: [SubscriptionTier; 3] = [
        SubscriptionTier::Free,
        SubscriptionTier::Starter,
        SubscriptionTier::Professional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionTier::Free => "Free",
            SubscriptionTier::Starter => "Starter",
            SubscriptionTier::Professional => "Professional",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionTier {
    type Err = PagewiseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        SubscriptionTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PagewiseError::InvalidFilter(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub tier: SubscriptionTier,
    pub website: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub description: String,
    pub created_at: Timestamp,
}

impl Searchable for Company {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        format!(
            "{} {} {} {} {} {} {}",
            self.name,
            self.industry,
            self.description,
            self.website,
            self.email,
            self.phone,
            self.address
        )
    }

    fn filter_value(&self, field: &str) -> Option<&str> {
        match field {
            "industry" => Some(&self.industry),
            "tier" => Some(self.tier.as_str()),
            _ => None,
        }
    }

    fn sort_key(&self) -> String {
        self.name.clone()
    }
}

/// Generate `count` fake companies using `rng`.
///
/// A seeded rng yields the same names, industries and ids every run; only
/// `created_at` reflects the wall clock.
pub fn generate_companies<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Company> {
    let now = Timestamp::now();
    (0..count).map(|_| generate_company(rng, now)).collect()
}

fn generate_company<R: Rng + ?Sized>(rng: &mut R, created_at: Timestamp) -> Company {
    let name = company_name(rng);
    let domain = website_domain(&name, rng);

    Company {
        id: company_id(rng),
        industry: pick(&INDUSTRIES, rng).to_string(),
        tier: *SubscriptionTier::ALL
            .choose(rng)
            .unwrap_or(&SubscriptionTier::Free),
        website: format!("https://{domain}"),
        email: format!("contact@{domain}"),
        phone: format!(
            "+1 ({}) {}-{}",
            rng.random_range(100..1000),
            rng.random_range(100..1000),
            rng.random_range(1000..10000)
        ),
        address: format!(
            "{} Main St, City, ST {}",
            rng.random_range(1..10000),
            rng.random_range(10000..100000)
        ),
        description: DESCRIPTION.to_string(),
        name,
        created_at,
    }
}

fn pick<'a, R: Rng + ?Sized>(options: &[&'a str], rng: &mut R) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

fn company_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix = pick(&NAME_PREFIXES, rng);
    let suffix = pick(&NAME_SUFFIXES, rng);
    if rng.random_bool(0.7) {
        let middle = pick(&NAME_MIDDLES, rng);
        format!("{prefix}{middle} {suffix}")
    } else {
        format!("{prefix} {suffix}")
    }
}

fn website_domain<R: Rng + ?Sized>(name: &str, rng: &mut R) -> String {
    let clean: String = name
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(15)
        .collect();
    format!("{clean}{}", pick(&DOMAINS, rng))
}

fn company_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 4] = rng.random();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("co-{hex}")
}
