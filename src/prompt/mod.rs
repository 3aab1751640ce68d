use crate::model::{Inputs, OutreachDraft};

pub const BRAND: &str = "Cehpoint";
pub const SIGN_OFF: &str = "Regards, Cehpoint Team";
pub const CLIENT_PLACEHOLDER: &str = "[Client Name]";

fn analysis_tasks(region: &str, industry: &str) -> String {
    format!(
r#"TASKS:
1. Service Name: the best-fit service from the catalog.
2. Target Company Profile: type, size, geography ({region}), industry ({industry}).
3. Decision-Maker Profile: primary and secondary stakeholders, department focus.
4. Client Pain Points: deep operational and financial pains.
5. Business Goals of the client.
6. Buying Triggers: events that create the need.
7. Budget & Commercial Readiness: estimated range, buying model, approval complexity.
8. Technical Maturity: likely stack, internal team capability, data readiness.
9. Success Criteria: how the client measures ROI.
10. Objections & Risks.
11. Why This Client Chooses Us: USP match.
12. Deal Qualification Checklist: typical likelihood booleans for an IDEAL client.
13. Ideal Engagement Model (e.g. Pilot -> Scale).
14. Red Flags: disqualifiers.
15. Upsell / Cross-Sell Potential."#,
        region = region,
        industry = industry
    )
}

fn deliverables(region: &str) -> String {
    format!(
r#"PLUS:
- Leads List: 5-8 REAL, SPECIFIC companies in {region} that fit this profile. For each give Name, Website, a brief Description and a Contact Email in a plausible corporate format (e.g. hello@domain.com). The contact email MUST NOT be blank.
- Outreach: a polished outreach email TEMPLATE.
    - Use placeholders like {placeholder} so it can be personalized.
    - Format: subject line, greeting, body, call to action, sign-off.
    - The sign-off must be exactly: "{sign_off}".
    - Tone: experienced and value-first, never pushy.
    - NO emojis or icons anywhere in the text."#,
        region = region,
        placeholder = CLIENT_PLACEHOLDER,
        sign_off = SIGN_OFF
    )
}

/// Instruction text for a full ICP analysis. Pure function of `inputs`.
pub fn generate_prompt(inputs: &Inputs) -> String {
    format!(
r#"You are a world-class executive strategy consultant and copywriter for '{brand}'.

OBJECTIVE:
Analyze {brand}'s service catalog to identify high-value opportunities and produce a complete Ideal Customer Profile with a ready-to-send proposal.

PARAMETERS:
- Target Market: {region}
- Target Industry: {industry}
- Context: {brand} operates as a digital-first company with global payment capabilities and a virtual presence.

SERVICE CATALOG:
"""
{catalog}
"""

{tasks}

{deliverables}

Return strictly valid JSON matching the schema."#,
        brand = BRAND,
        region = inputs.region,
        industry = inputs.industry,
        catalog = inputs.catalog_text.trim(),
        tasks = analysis_tasks(&inputs.region, &inputs.industry),
        deliverables = deliverables(&inputs.region)
    )
}

/// Instruction text for rewriting the outreach email according to `feedback`.
pub fn refine_prompt(current: &OutreachDraft, feedback: &str, catalog_text: &str) -> String {
    format!(
r#"You are a world-class executive copywriter.

TASK: Rewrite an existing B2B proposal email according to specific user feedback.

CONTEXT (company services):
"{catalog}"

CURRENT DRAFT:
Subject: {subject}
Body:
{body}

USER FEEDBACK / INSTRUCTIONS:
"{feedback}"

REQUIREMENTS:
- Strictly follow the user's feedback (e.g. "make it shorter", "focus on robotics", "change the tone").
- Keep professional corporate formatting: salutation, spacing, bullet points, sign-off.
- Keep the tone top-tier professional.

Return JSON: {{ "subject": string, "body": string }}"#,
        catalog = catalog_text.trim(),
        subject = current.subject,
        body = current.body,
        feedback = feedback.trim()
    )
}
