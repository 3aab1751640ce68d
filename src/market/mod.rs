use crate::errors::IcpError;

/// Target countries with their business hubs. The first hub is the default.
pub const MARKETS: &[(&str, &[&str])] = &[
    ("USA", &["New York", "San Francisco / Silicon Valley", "Austin", "Chicago", "Boston"]),
    ("United Kingdom", &["London", "Manchester", "Edinburgh"]),
    ("Germany", &["Munich", "Berlin", "Frankfurt", "Hamburg"]),
    ("Canada", &["Toronto", "Calgary", "Vancouver", "Montreal"]),
    ("Australia", &["Sydney", "Melbourne", "Brisbane"]),
    ("UAE", &["Dubai", "Abu Dhabi"]),
    ("India", &["Bangalore", "Mumbai", "Gurgaon", "Kolkata", "Hyderabad"]),
    ("Singapore", &["Singapore City"]),
    ("Switzerland", &["Zurich", "Geneva"]),
    ("Global / Remote", &["Worldwide"]),
];

pub const INDUSTRIES: &[&str] = &[
    "BFSI (Banking, Financial Services, Insurance)",
    "Enterprise SaaS & Cloud Computing",
    "Healthcare & Life Sciences (Biotech)",
    "Manufacturing & Industrial IoT",
    "E-Commerce & Retail Tech",
    "Real Estate & PropTech",
    "Energy, Oil & Gas (Cleantech)",
    "Logistics & Supply Chain Management",
    "Government & Public Sector",
    "Legal Tech & Professional Services",
    "Automotive & Autonomous Systems",
    "Education Technology (EdTech)",
];

/// Catalog text offered by the form's "load catalog" action.
pub const EXAMPLE_CATALOG: &str = "Cehpoint
Technologies - Innovation - Intelligence

Service Catalog 2025-26
www.cehpoint.co.in

Vision & Mission
Cehpoint is more than a software company; we are a digital-first partner delivering
custom software, AI/ML solutions, cloud migration, cybersecurity and data engineering
for enterprises and fast-growing startups.";

pub fn hubs(country: &str) -> Option<&'static [&'static str]> {
    MARKETS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(country))
        .map(|(_, hubs)| *hubs)
}

/// Country + city selection. Changing the country resets the city to that
/// country's first hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSelection {
    country: &'static str,
    city: &'static str,
}

impl Default for MarketSelection {
    fn default() -> Self {
        let (country, hubs) = MARKETS[0];
        Self { country, city: hubs[0] }
    }
}

impl MarketSelection {
    pub fn country(&self) -> &'static str {
        self.country
    }

    pub fn city(&self) -> &'static str {
        self.city
    }

    pub fn select_country(&mut self, name: &str) -> Result<(), IcpError> {
        let &(country, hubs) = MARKETS
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(name))
            .ok_or_else(|| IcpError::InvalidInput(format!("unknown country: {name}")))?;
        self.country = country;
        self.city = hubs[0];
        Ok(())
    }

    pub fn select_city(&mut self, name: &str) -> Result<(), IcpError> {
        let hubs = hubs(self.country).unwrap_or(&[]);
        self.city = hubs
            .iter()
            .find(|h| h.eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| {
                IcpError::InvalidInput(format!("{name} is not a hub in {}", self.country))
            })?;
        Ok(())
    }

    /// `"<city>, <country>"`, the region string sent to the model.
    pub fn region(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

/// Industry selection: a listed industry, or "Other" with free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndustryChoice {
    Listed(&'static str),
    Other,
}

impl Default for IndustryChoice {
    fn default() -> Self {
        IndustryChoice::Listed(INDUSTRIES[0])
    }
}

impl IndustryChoice {
    pub fn parse(name: &str) -> Result<Self, IcpError> {
        if name.trim().eq_ignore_ascii_case("other") {
            return Ok(IndustryChoice::Other);
        }
        INDUSTRIES
            .iter()
            .find(|i| i.eq_ignore_ascii_case(name.trim()))
            .map(|i| IndustryChoice::Listed(*i))
            .ok_or_else(|| IcpError::InvalidInput(format!("unknown industry: {name}")))
    }
}

/// A non-blank custom industry always wins over the list choice.
pub fn resolve_industry(choice: &IndustryChoice, custom: Option<&str>) -> Result<String, IcpError> {
    match (choice, custom.map(str::trim).filter(|c| !c.is_empty())) {
        (_, Some(custom)) => Ok(custom.to_string()),
        (IndustryChoice::Listed(name), None) => Ok((*name).to_string()),
        (IndustryChoice::Other, None) => {
            Err(IcpError::InvalidInput("\"Other\" industry needs a description".into()))
        }
    }
}
