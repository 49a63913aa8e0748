//! Canonical rendering of sign-in parameters.

use signon_types::AuthRequestParams;

/// Render the canonical sign-in message for `params`, signed by `address`.
///
/// Line-oriented EIP-4361-style template, joined with `\n`, no trailing
/// newline:
///
/// ```text
/// example.com wants you to sign in with your Ethereum account:
/// 0x724d0D2DaD3fbB0C168f947B87Fa5DBe36F1A8bf
///
/// I accept the Terms of Service
///
/// URI: https://example.com/login
/// Version: 1
/// Chain ID: 1
/// Nonce: abc123
/// Issued At: 2024-05-01T12:00:00Z
/// ```
///
/// Optional lines (`Expiration Time`, `Not Before`, `Request ID`,
/// `Resources`) appear only when set. The `Chain ID` line carries the
/// CAIP-2 reference part (`1` for `eip155:1`).
#[must_use]
pub fn render_message(params: &AuthRequestParams, address: &str) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(16);

    lines.push(format!(
        "{} wants you to sign in with your {} account:",
        params.domain,
        account_kind(&params.chain_id)
    ));
    lines.push(address.to_string());
    lines.push(String::new());

    if let Some(statement) = &params.statement {
        lines.push(statement.clone());
        lines.push(String::new());
    }

    lines.push(format!("URI: {}", params.aud));
    lines.push("Version: 1".to_string());
    lines.push(format!("Chain ID: {}", chain_reference(&params.chain_id)));
    lines.push(format!("Nonce: {}", params.nonce));
    lines.push(format!("Issued At: {}", params.issued_at));

    if let Some(expiration) = &params.expiration_time {
        lines.push(format!("Expiration Time: {expiration}"));
    }
    if let Some(not_before) = &params.not_before {
        lines.push(format!("Not Before: {not_before}"));
    }
    if let Some(request_id) = &params.request_id {
        lines.push(format!("Request ID: {request_id}"));
    }
    if !params.resources.is_empty() {
        lines.push("Resources:".to_string());
        for resource in &params.resources {
            lines.push(format!("- {resource}"));
        }
    }

    lines.join("\n")
}

/// Human wording for the account kind, keyed by CAIP-2 namespace.
fn account_kind(chain_id: &str) -> &'static str {
    match chain_id.split(':').next().unwrap_or_default() {
        "eip155" => "Ethereum",
        "solana" => "Solana",
        _ => "blockchain",
    }
}

/// The reference part of a CAIP-2 chain id (`1` for `eip155:1`).
fn chain_reference(chain_id: &str) -> &str {
    chain_id.split(':').nth(1).unwrap_or(chain_id)
}
