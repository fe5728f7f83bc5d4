// src/utils/allowlist.rs

/// Registered domains a consent event may be submitted for or from.
///
/// Built once at startup and never mutated. Matching is pure string
/// comparison: no DNS, no punycode handling beyond what the configured
/// entries already use.
#[derive(Debug, Clone)]
pub struct DomainAllowlist {
    entries: Vec<String>,
    // `www.`-prefixed entries also register their suffix as a root, so that
    // `www.example.com` admits `example.com` and any subdomain of it.
    roots: Vec<String>,
}

impl DomainAllowlist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<String> = entries
            .into_iter()
            .map(|entry| entry.as_ref().trim().to_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();

        let roots = entries
            .iter()
            .map(|entry| {
                entry
                    .strip_prefix("www.")
                    .unwrap_or(entry.as_str())
                    .to_string()
            })
            .collect();

        Self { entries, roots }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// ホスト名が許可リストに含まれるか（サブドメインも含めて）判定する
    pub fn is_host_allowed(&self, host: &str) -> bool {
        let host = normalize_host(host);
        if host.is_empty() {
            return false;
        }

        if self.entries.iter().any(|entry| *entry == host) {
            return true;
        }

        self.roots
            .iter()
            .any(|root| host == *root || host.ends_with(&format!(".{}", root)))
    }
}

/// Lowercase a hostname and strip a trailing `:port`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().to_lowercase();
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
            name.to_string()
        }
        _ => host,
    }
}
