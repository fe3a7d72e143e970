//! Domain name classification.
//!
//! The hosted zone always lives at the registrable root. A deploy to
//! `staging.example.com` reuses the `example.com` zone and gets a
//! single-domain certificate; a deploy to the apex also covers `www`.

/// The registrable root of `domain`: its last two labels.
///
/// Multi-part public suffixes (`co.uk`) are not handled; operators on
/// such TLDs should point the config at the root themselves.
pub fn root_domain(domain: &str) -> String {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() <= 2 {
        domain.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}

/// Whether `domain` has labels below the registrable root.
pub fn is_subdomain(domain: &str) -> bool {
    domain.split('.').count() > 2
}

/// The domain set a certificate must cover.
///
/// Apex deploys also serve `www.`; subdomain deploys cover exactly
/// themselves.
pub fn cert_domains(domain: &str) -> Vec<String> {
    if is_subdomain(domain) {
        vec![domain.to_string()]
    } else {
        vec![domain.to_string(), format!("www.{domain}")]
    }
}
