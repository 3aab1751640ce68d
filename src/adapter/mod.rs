use serde::de::DeserializeOwned;
use serde_json::error::Category;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::Credentials;
use crate::errors::IcpError;
use crate::model::{IcpReport, Inputs, OutreachDraft};
use crate::prompt;
use crate::provider::{DynProvider, StructuredRequest};
use crate::schema::{icp_schema, refinement_schema};

pub const GENERATE_TEMPERATURE: f32 = 0.3;
pub const REFINE_TEMPERATURE: f32 = 0.4;

/// Wraps the provider with credential resolution, the response contract and
/// validation. Every failure comes out as an `IcpError`.
pub struct Adapter {
    provider: DynProvider,
    credentials: Credentials,
}

impl Adapter {
    pub fn new(provider: DynProvider, credentials: Credentials) -> Self {
        Self { provider, credentials }
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub async fn generate_icp(&self, inputs: &Inputs) -> Result<IcpReport, IcpError> {
        let req = StructuredRequest {
            operation: "generate",
            prompt: prompt::generate_prompt(inputs),
            schema: icp_schema(),
            temperature: GENERATE_TEMPERATURE,
        };
        self.call(&req).await
    }

    pub async fn refine_outreach(
        &self,
        current: &OutreachDraft,
        feedback: &str,
        catalog_text: &str,
    ) -> Result<OutreachDraft, IcpError> {
        if feedback.trim().is_empty() {
            return Err(IcpError::InvalidInput("refinement feedback is empty".into()));
        }
        let req = StructuredRequest {
            operation: "refine",
            prompt: prompt::refine_prompt(current, feedback, catalog_text),
            schema: refinement_schema(),
            temperature: REFINE_TEMPERATURE,
        };
        self.call(&req).await
    }

    async fn call<T: DeserializeOwned>(&self, req: &StructuredRequest) -> Result<T, IcpError> {
        let span = info_span!(
            "model_call",
            op = req.operation,
            request_id = %Uuid::new_v4(),
            model = self.provider.model()
        );
        async {
            // Fails before any network attempt.
            let api_key = self.credentials.resolve()?;
            let text = self
                .provider
                .send(&api_key, req)
                .await?
                .ok_or(IcpError::EmptyResponse)?;
            let out = parse_structured(&text)?;
            info!("structured response accepted");
            Ok::<T, IcpError>(out)
        }
        .instrument(span.clone())
        .await
        .map_err(|e| {
            span.in_scope(|| error!(kind = ?e.kind(), "{e}"));
            e
        })
    }
}

/// Parse model text into `T`. Typed deserialization is the validation: a
/// missing field or an out-of-set enum value rejects the whole response.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, IcpError> {
    if text.trim().is_empty() {
        return Err(IcpError::EmptyResponse);
    }
    serde_json::from_str(text).map_err(|e| match e.classify() {
        Category::Data => IcpError::Malformed(format!("response does not match the expected shape: {e}")),
        Category::Syntax | Category::Eof | Category::Io => {
            IcpError::Malformed(format!("response is not valid JSON: {e}"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::model::fixtures::report_json;
    use crate::provider::testing::{Scripted, ScriptedProvider};
    use serde_json::json;

    fn adapter(provider: &ScriptedProvider, key: Option<&str>) -> Adapter {
        Adapter::new(
            Box::new(provider.clone()),
            Credentials {
                inline: key.map(String::from),
                env_var: "ICP_FORGE_TEST_UNSET_KEY".into(),
            },
        )
    }

    fn inputs() -> Inputs {
        Inputs::new("We build CRM integrations", "Bangalore, India", "Enterprise SaaS & Cloud Computing")
            .unwrap()
    }

    #[tokio::test]
    async fn generate_sends_prompt_schema_and_low_temperature() {
        let p = ScriptedProvider::new(vec![Scripted::text(report_json("Bangalore, India"))]);
        let report = adapter(&p, Some("k")).generate_icp(&inputs()).await.unwrap();
        assert_eq!(report.company_profile.geography, "Bangalore, India");

        let sent = p.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].operation, "generate");
        assert_eq!(sent[0].prompt, prompt::generate_prompt(&inputs()));
        assert_eq!(sent[0].schema, icp_schema());
        assert!((sent[0].temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(p.keys(), vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let p = ScriptedProvider::new(vec![Scripted::text(report_json("x"))]);
        let err = adapter(&p, None).generate_icp(&inputs()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(p.calls(), 0);
    }

    #[tokio::test]
    async fn empty_response_is_reported() {
        let p = ScriptedProvider::new(vec![Scripted::Empty]);
        let err = adapter(&p, Some("k")).generate_icp(&inputs()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResponse);
        assert_eq!(err.to_string(), "no response from AI");
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let p = ScriptedProvider::new(vec![Scripted::Fail("connection reset".into())]);
        let err = adapter(&p, Some("k")).generate_icp(&inputs()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn schema_mismatch_is_malformed() {
        let mut bad = report_json("Bangalore, India");
        bad["commercialReadiness"]["approvalComplexity"] = json!("Trivial");
        let p = ScriptedProvider::new(vec![Scripted::text(bad)]);
        let err = adapter(&p, Some("k")).generate_icp(&inputs()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(err.to_string().contains("unknown variant `Trivial`"));
    }

    #[tokio::test]
    async fn refine_uses_refinement_contract() {
        let p = ScriptedProvider::new(vec![Scripted::text(json!({
            "subject": "CRM, simplified",
            "body": "Dear [Client Name],\nShort version.\nRegards, Cehpoint Team"
        }))]);
        let current = OutreachDraft { subject: "Long subject".into(), body: "Long body".into() };
        let draft = adapter(&p, Some("k"))
            .refine_outreach(&current, "make it shorter", "We build CRM integrations")
            .await
            .unwrap();
        assert_eq!(draft.subject, "CRM, simplified");

        let sent = p.requests();
        assert_eq!(sent[0].operation, "refine");
        assert_eq!(sent[0].schema, refinement_schema());
        assert!((sent[0].temperature - 0.4).abs() < f32::EPSILON);
        assert!(sent[0].prompt.contains("make it shorter"));
    }

    #[tokio::test]
    async fn blank_feedback_is_rejected_before_calling() {
        let p = ScriptedProvider::new(vec![]);
        let current = OutreachDraft { subject: "s".into(), body: "b".into() };
        let err = adapter(&p, Some("k")).refine_outreach(&current, "  ", "catalog").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(p.calls(), 0);
    }

    #[test]
    fn parse_separates_bad_json_from_bad_shape() {
        let err = parse_structured::<OutreachDraft>("Sure! Here is your email").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(err.to_string().contains("not valid JSON"));

        let err = parse_structured::<IcpReport>("{}").unwrap_err();
        assert!(err.to_string().contains("does not match the expected shape"));
        assert!(err.to_string().contains("missing field `serviceName`"));

        let mut no_leads = report_json("Bangalore, India");
        no_leads.as_object_mut().unwrap().remove("potentialClients");
        let err = parse_structured::<IcpReport>(&no_leads.to_string()).unwrap_err();
        assert!(err.to_string().contains("missing field `potentialClients`"));

        assert_eq!(
            parse_structured::<OutreachDraft>("  ").unwrap_err().kind(),
            ErrorKind::EmptyResponse
        );
    }
}
