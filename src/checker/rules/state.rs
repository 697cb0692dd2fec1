use super::keys;
use crate::checker::{RequestRule, ResultBag, RuleData, RuleResult};
use crate::error::Result;
use crate::request::ServerRequest;

/// Captures the `state` parameter.
///
/// Always produces a result (`Option<String>`) so later rules can echo the
/// state back in redirected errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateRule;

impl RequestRule for StateRule {
    fn key(&self) -> &str {
        keys::STATE
    }

    fn check_rule(
        &self,
        request: &ServerRequest,
        _results: &ResultBag,
        _data: &mut RuleData,
        _use_fragment: bool,
    ) -> Result<Option<RuleResult>> {
        let state = request.param("state").map(String::from);
        Ok(Some(RuleResult::new(keys::STATE, state)))
    }
}
