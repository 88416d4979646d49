// file: src/nvd/cpe.rs
// description: common platform enumeration identifiers for detected services
// reference: https://nvlpubs.nist.gov/nistpubs/Legacy/IR/nistir7695.pdf

const CPE23_PREFIX: &str = "cpe:2.3:";
const CPE22_PREFIX: &str = "cpe:/";
const CPE23_COMPONENTS: usize = 11;

/// Builds an application identifier from service fields. Unknown fields
/// become the `*` wildcard.
pub fn generate(name: &str, product: Option<&str>, version: Option<&str>) -> String {
    let vendor = component(name);
    let product = component(product.unwrap_or_default());
    let version = component(version.unwrap_or_default());

    format!("cpe:2.3:a:{}:{}:{}:*:*:*:*:*:*:*", vendor, product, version)
}

/// Rewrites the `cpe:/part:vendor:product:version` URI form into a full
/// 2.3 formatted string. Input already in 2.3 form is returned unchanged.
pub fn to_cpe23(uri: &str) -> Option<String> {
    let uri = uri.trim();
    if uri.starts_with(CPE23_PREFIX) {
        return Some(uri.to_string());
    }

    let body = uri.strip_prefix(CPE22_PREFIX)?;
    if body.is_empty() {
        return None;
    }

    let mut components: Vec<String> = body
        .split(':')
        .map(|part| if part.is_empty() { "*".to_string() } else { part.to_lowercase() })
        .collect();
    if components.len() > CPE23_COMPONENTS {
        return None;
    }
    components.resize(CPE23_COMPONENTS, "*".to_string());

    Some(format!("{}{}", CPE23_PREFIX, components.join(":")))
}

/// Identifiers used to look up a service: stored ones converted to 2.3 form,
/// or one generated from the service fields when none convert.
pub fn resolve(stored: &[String], name: &str, product: Option<&str>, version: Option<&str>) -> Vec<String> {
    let mut resolved: Vec<String> = stored.iter().filter_map(|cpe| to_cpe23(cpe)).collect();
    resolved.dedup();

    if resolved.is_empty() {
        resolved.push(generate(name, product, version));
    }
    resolved
}

fn component(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return "*".to_string();
    }
    value.to_lowercase().replace(' ', "_").replace(':', "\\:")
}
