use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::IcpError;

/// One form submission. Kept by the session as the last inputs so a retry
/// can replay the exact same request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inputs {
    pub catalog_text: String,
    pub region: String,
    pub industry: String,
}

impl Inputs {
    pub fn new(
        catalog_text: impl Into<String>,
        region: impl Into<String>,
        industry: impl Into<String>,
    ) -> Result<Self, IcpError> {
        let catalog_text = catalog_text.into();
        if catalog_text.trim().is_empty() {
            return Err(IcpError::InvalidInput("service catalog text is empty".into()));
        }
        Ok(Self {
            catalog_text,
            region: region.into(),
            industry: industry.into(),
        })
    }
}

/// Shared three-level scale used by approval complexity and data readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum TeamStatus {
    None,
    Limited,
    Mature,
}

impl TeamStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TeamStatus::None => "None",
            TeamStatus::Limited => "Limited",
            TeamStatus::Mature => "Mature",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompanyProfile {
    #[serde(rename = "type")]
    #[schemars(description = "Company structure type (e.g. SMB, Enterprise)")]
    pub kind: String,
    #[schemars(description = "Employees count and Revenue range")]
    pub size: String,
    pub geography: String,
    pub industry: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DecisionMaker {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    #[schemars(description = "Key department and role focus")]
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommercialReadiness {
    pub budget_range: String,
    pub buying_model: String,
    pub approval_complexity: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalMaturity {
    pub tech_stack: Vec<String>,
    pub team_status: TeamStatus,
    pub data_readiness: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectionsAndRisks {
    pub common_objections: Vec<String>,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QualificationChecklist {
    pub problem_clarity: bool,
    pub budget_clarity: bool,
    pub decision_maker_access: bool,
    pub timeline_defined: bool,
    pub strategic_fit: bool,
}

impl QualificationChecklist {
    /// Label/value pairs in display order.
    pub fn items(&self) -> [(&'static str, bool); 5] {
        [
            ("Problem clarity", self.problem_clarity),
            ("Budget clarity", self.budget_clarity),
            ("Decision-maker access", self.decision_maker_access),
            ("Timeline defined", self.timeline_defined),
            ("Strategic fit", self.strategic_fit),
        ]
    }

    pub fn score(&self) -> usize {
        self.items().iter().filter(|(_, v)| *v).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PotentialClient {
    pub name: String,
    pub website: String,
    pub description: String,
    #[schemars(description = "A plausible general contact email (e.g. info@, partnerships@)")]
    pub contact_email: String,
}

/// Editable outreach email. Starts as the report's template and is then
/// edited or refined on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutreachDraft {
    pub subject: String,
    pub body: String,
}

/// The full Ideal Customer Profile returned by a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IcpReport {
    pub service_name: String,
    pub company_profile: CompanyProfile,
    pub decision_maker: DecisionMaker,
    pub pain_points: Vec<String>,
    pub business_goals: Vec<String>,
    pub buying_triggers: Vec<String>,
    pub commercial_readiness: CommercialReadiness,
    pub technical_maturity: TechnicalMaturity,
    pub success_criteria: Vec<String>,
    pub objections_and_risks: ObjectionsAndRisks,
    pub why_us: String,
    pub qualification_checklist: QualificationChecklist,
    pub engagement_model: String,
    pub red_flags: Vec<String>,
    pub upsell_potential: Vec<String>,
    #[schemars(description = "List of 5-8 specific, real companies in the target market.")]
    pub potential_clients: Vec<PotentialClient>,
    pub outreach_template: OutreachDraft,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    /// A schema-conformant report body as the model would return it.
    pub fn report_json(geography: &str) -> Value {
        json!({
            "serviceName": "CRM Integration Services",
            "companyProfile": {
                "type": "Enterprise",
                "size": "500-2000 employees, $50M-$250M revenue",
                "geography": geography,
                "industry": "Enterprise SaaS & Cloud Computing"
            },
            "decisionMaker": {
                "primary": ["CTO", "VP Sales Operations"],
                "secondary": ["Head of IT"],
                "role": "Revenue operations"
            },
            "painPoints": ["Siloed customer data"],
            "businessGoals": ["Shorter sales cycles"],
            "buyingTriggers": ["CRM migration"],
            "commercialReadiness": {
                "budgetRange": "$40k-$120k",
                "buyingModel": "Retainer",
                "approvalComplexity": "Medium"
            },
            "technicalMaturity": {
                "techStack": ["Salesforce", "AWS"],
                "teamStatus": "Limited",
                "dataReadiness": "High"
            },
            "successCriteria": ["Pipeline visibility"],
            "objectionsAndRisks": {
                "commonObjections": ["Vendor lock-in"],
                "riskFactors": ["Legacy data quality"]
            },
            "whyUs": "Deep CRM expertise",
            "qualificationChecklist": {
                "problemClarity": true,
                "budgetClarity": true,
                "decisionMakerAccess": false,
                "timelineDefined": true,
                "strategicFit": true
            },
            "engagementModel": "Pilot -> Scale",
            "redFlags": ["No executive sponsor"],
            "upsellPotential": ["Analytics dashboards"],
            "potentialClients": [
                {
                    "name": "Freshworks",
                    "website": "https://www.freshworks.com",
                    "description": "Customer engagement SaaS",
                    "contactEmail": "partnerships@freshworks.com"
                }
            ],
            "outreachTemplate": {
                "subject": "Unifying your CRM data",
                "body": "Dear [Client Name],\n\nWe help...\n\nRegards, Cehpoint Team"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_catalog_is_rejected() {
        let err = Inputs::new("   \n", "London, United Kingdom", "Legal Tech").unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::InvalidInput);
    }

    #[test]
    fn report_uses_camel_case_wire_names() {
        let report: IcpReport =
            serde_json::from_value(fixtures::report_json("Bangalore, India")).unwrap();
        assert_eq!(report.company_profile.kind, "Enterprise");
        assert_eq!(report.commercial_readiness.approval_complexity, Level::Medium);
        assert_eq!(report.technical_maturity.team_status, TeamStatus::Limited);
        assert_eq!(report.qualification_checklist.score(), 4);

        let back = serde_json::to_value(&report).unwrap();
        assert_eq!(back["companyProfile"]["type"], "Enterprise");
        assert_eq!(back["potentialClients"][0]["contactEmail"], "partnerships@freshworks.com");
    }

    #[test]
    fn unknown_enum_value_does_not_deserialize() {
        let mut v = fixtures::report_json("Dubai, UAE");
        v["technicalMaturity"]["teamStatus"] = "Expert".into();
        assert!(serde_json::from_value::<IcpReport>(v).is_err());
    }
}
