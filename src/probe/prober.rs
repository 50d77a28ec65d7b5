//! Per-domain query orchestration.
//!
//! A probe issues the NS, A, MX, root TXT and `_dmarc` TXT queries concurrently,
//! then the DKIM selector queries concurrently, and finally evaluates matches and
//! email-authentication validity. The whole collection phase runs under the
//! per-domain deadline.

use futures::future::join_all;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::dns::{execute_query, DnsResponse, QueryOutcome, RecordKind};
use crate::domain::normalize_domain;
use crate::error_handling::{ProbeError, ProcessingStats};
use crate::record::{
    a_match, dkim_record_status, dmarc_is_valid, extract_dmarc, extract_spf, mx_match,
    normalize_hosts, ns_match, spf_is_valid,
};

use super::types::{DkimSelectorResult, DomainCheckResult, ProbeContext, ProbeOutcome, ProbeSettings};

/// Probes one domain and returns its result, broken or not.
pub async fn probe(
    domain: &str,
    ctx: &ProbeContext,
    cancel: &CancellationToken,
) -> DomainCheckResult {
    probe_domain(domain, ctx, cancel).await.into_result()
}

/// Probes one domain, keeping the reason it was abandoned.
///
/// The input is normalized first; a name that fails normalization yields a
/// broken result without any resolver call.
pub async fn probe_domain(
    domain: &str,
    ctx: &ProbeContext,
    cancel: &CancellationToken,
) -> ProbeOutcome {
    let name = match normalize_domain(domain) {
        Ok(name) => name,
        Err(e) => {
            let error = ProbeError::InvalidDomain(e.to_string());
            return abandon(DomainCheckResult::invalid(domain, &error), error, ctx);
        }
    };

    let mut result = DomainCheckResult::new(name.clone());
    let deadline = ctx.settings.domain_timeout;
    let collected =
        tokio::time::timeout(deadline, collect_records(&name, ctx, cancel, &mut result)).await;

    let error = match collected {
        Ok(Ok(())) => {
            evaluate(&mut result, &ctx.settings);
            debug!(
                "{name}: ns_match={} a_match={} mx_match={} spf_valid={} dmarc_valid={} dkim_valid={} ({} query error(s))",
                result.ns_match,
                result.a_match,
                result.mx_match,
                result.spf_valid,
                result.dmarc_valid,
                result.dkim_valid,
                result.query_errors.len()
            );
            return ProbeOutcome::Completed(result);
        }
        Ok(Err(e)) => e,
        Err(_) => ProbeError::DeadlineExceeded(deadline),
    };

    result.mark_broken(&error);
    abandon(result, error, ctx)
}

fn abandon(result: DomainCheckResult, error: ProbeError, ctx: &ProbeContext) -> ProbeOutcome {
    log::warn!("{}: marked broken: {error}", result.domain);
    ctx.stats.increment_error(error.error_type());
    ProbeOutcome::Failed { result, error }
}

async fn collect_records(
    name: &str,
    ctx: &ProbeContext,
    cancel: &CancellationToken,
    result: &mut DomainCheckResult,
) -> Result<(), ProbeError> {
    // Cancelled on a fatal resolver error so sibling queries stop early
    let domain_cancel = cancel.child_token();
    let dmarc_name = format!("_dmarc.{name}");
    let mut abort: Option<ProbeError> = None;

    let (ns, a, mx, txt, dmarc) = tokio::join!(
        run_query(ctx, &domain_cancel, name, RecordKind::Ns),
        run_query(ctx, &domain_cancel, name, RecordKind::A),
        run_query(ctx, &domain_cancel, name, RecordKind::Mx),
        run_query(ctx, &domain_cancel, name, RecordKind::Txt),
        run_query(ctx, &domain_cancel, &dmarc_name, RecordKind::Txt),
    );

    let stats = ctx.stats.as_ref();
    if let Some(response) = take_response(ns, result, stats, &mut abort) {
        result.ns_records = normalize_hosts(&response.ns_names());
    }
    if let Some(response) = take_response(a, result, stats, &mut abort) {
        result.a_records = response.a_addresses();
    }
    if let Some(response) = take_response(mx, result, stats, &mut abort) {
        result.mx_records = normalize_hosts(&response.mx_exchanges());
    }
    if let Some(response) = take_response(txt, result, stats, &mut abort) {
        result.spf_record = extract_spf(&response.txt_fragments());
    }
    if let Some(response) = take_response(dmarc, result, stats, &mut abort) {
        result.dmarc_record = extract_dmarc(&response.txt_records());
    }
    if let Some(error) = abort {
        return Err(abort_reason(error, cancel));
    }

    let selectors = &ctx.settings.dkim_selectors;
    let selector_names: Vec<String> = selectors
        .iter()
        .map(|selector| format!("{selector}._domainkey.{name}"))
        .collect();
    let outcomes = join_all(
        selector_names
            .iter()
            .map(|selector_name| run_query(ctx, &domain_cancel, selector_name, RecordKind::Txt)),
    )
    .await;

    for (selector, outcome) in selectors.iter().zip(outcomes) {
        let Some(response) = take_response(outcome, result, stats, &mut abort) else {
            continue;
        };
        if let Some((record, valid)) = dkim_record_status(&response.txt_records()) {
            result
                .dkim_selector_results
                .insert(selector.clone(), DkimSelectorResult { record, valid });
        }
    }

    match abort {
        Some(error) => Err(abort_reason(error, cancel)),
        None => Ok(()),
    }
}

async fn run_query(
    ctx: &ProbeContext,
    domain_cancel: &CancellationToken,
    name: &str,
    kind: RecordKind,
) -> Result<QueryOutcome, ProbeError> {
    let label = format!("{kind} {name}");
    let outcome = execute_query(
        ctx.resolver.as_ref(),
        name,
        kind,
        &label,
        &ctx.settings.retry,
        domain_cancel,
    )
    .await;
    if matches!(outcome, Err(ProbeError::Fatal(_))) {
        domain_cancel.cancel();
    }
    outcome
}

/// Returns the response of an answered query; records failures on the way.
fn take_response(
    outcome: Result<QueryOutcome, ProbeError>,
    result: &mut DomainCheckResult,
    stats: &ProcessingStats,
    abort: &mut Option<ProbeError>,
) -> Option<DnsResponse> {
    match outcome {
        Ok(QueryOutcome::Answered(response)) => Some(response),
        Ok(QueryOutcome::Failed(failure)) => {
            stats.increment_error(failure.kind);
            result.query_errors.push(failure.message);
            None
        }
        Err(error) => {
            // A fatal error outranks the cancellations it caused in sibling queries
            let replace = match abort {
                None => true,
                Some(ProbeError::Cancelled) => matches!(error, ProbeError::Fatal(_)),
                Some(_) => false,
            };
            if replace {
                *abort = Some(error);
            }
            None
        }
    }
}

fn abort_reason(error: ProbeError, cancel: &CancellationToken) -> ProbeError {
    if cancel.is_cancelled() {
        ProbeError::Cancelled
    } else {
        error
    }
}

fn evaluate(result: &mut DomainCheckResult, settings: &ProbeSettings) {
    let targets = &settings.targets;
    result.ns_match = ns_match(&result.ns_records, &targets.ns);
    result.a_match = a_match(&result.a_records, &targets.a);
    result.mx_match = mx_match(&result.mx_records, targets.mx.as_deref());
    result.spf_valid = result.spf_record.as_deref().is_some_and(spf_is_valid);
    result.dmarc_valid = result.dmarc_record.as_deref().is_some_and(dmarc_is_valid);

    let mut found: Vec<String> = Vec::new();
    for selector in &settings.dkim_selectors {
        if result.dkim_selector_results.contains_key(selector) && !found.contains(selector) {
            found.push(selector.clone());
        }
    }
    result.dkim_records = found;
    result.dkim_valid = result.dkim_selector_results.values().any(|r| r.valid);
}
