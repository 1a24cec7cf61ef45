// src/webscan/fingerprint/cve.rs
use serde::Serialize;

/// A known vulnerability affecting a range of framework versions.
#[derive(Debug, Clone, Serialize)]
pub struct CveEntry {
    pub cve: &'static str,
    /// Matched exactly or as a literal prefix of the detected version.
    pub affected_versions: &'static [&'static str],
    pub fixed_version: &'static str,
    pub severity: &'static str,
    pub description: &'static str,
    pub recommendations: &'static [&'static str],
}

impl CveEntry {
    pub fn affects(&self, version: &str) -> bool {
        self.affected_versions
            .iter()
            .any(|affected| version == *affected || version.starts_with(affected))
    }
}

static LARAVEL: &[CveEntry] = &[
    CveEntry {
        cve: "CVE-2021-3129",
        affected_versions: &["8.0.0", "8.0.1", "8.0.2", "8.1.0", "8.2.0", "8.3.0", "8.4.0", "8.4.1"],
        fixed_version: "8.4.2",
        severity: "critical",
        description: "Ignition debug mode RCE vulnerability",
        recommendations: &["Update to Laravel 8.4.2 or later", "Disable debug mode in production"],
    },
    CveEntry {
        cve: "CVE-2021-21263",
        affected_versions: &["8.0.0", "8.1.0", "8.2.0", "8.3.0", "8.4.0"],
        fixed_version: "8.5.0",
        severity: "high",
        description: "SQL injection via request validation",
        recommendations: &["Update to Laravel 8.5.0 or later", "Use parameterized queries"],
    },
];

static DJANGO: &[CveEntry] = &[
    CveEntry {
        cve: "CVE-2023-36053",
        affected_versions: &["3.2.0", "3.2.1", "3.2.2", "4.0.0", "4.1.0"],
        fixed_version: "4.2.3",
        severity: "high",
        description: "Potential ReDoS in EmailValidator and URLValidator",
        recommendations: &["Update to Django 4.2.3 or later"],
    },
    CveEntry {
        cve: "CVE-2023-31047",
        affected_versions: &["3.2.0", "4.0.0", "4.1.0"],
        fixed_version: "4.1.9",
        severity: "medium",
        description: "File upload validation bypass",
        recommendations: &["Update to Django 4.1.9 or later", "Implement additional file validation"],
    },
];

static WORDPRESS: &[CveEntry] = &[CveEntry {
    cve: "CVE-2023-2745",
    affected_versions: &["5.0", "5.1", "5.2", "5.3", "5.4", "5.5", "5.6", "5.7", "5.8", "5.9", "6.0", "6.1"],
    fixed_version: "6.2",
    severity: "medium",
    description: "Directory traversal vulnerability",
    recommendations: &["Update to WordPress 6.2 or later"],
}];

static DRUPAL: &[CveEntry] = &[CveEntry {
    cve: "CVE-2023-44487",
    affected_versions: &["9.0", "9.1", "9.2", "9.3", "9.4", "9.5", "10.0"],
    fixed_version: "10.1.4",
    severity: "high",
    description: "HTTP/2 rapid reset attack (DoS)",
    recommendations: &["Update to Drupal 10.1.4 or later", "Configure HTTP/2 rate limiting"],
}];

static NEXTJS: &[CveEntry] = &[CveEntry {
    cve: "CVE-2023-46298",
    affected_versions: &["13.0.0", "13.1.0", "13.2.0", "13.3.0", "13.4.0"],
    fixed_version: "13.5.0",
    severity: "medium",
    description: "Server-side request forgery vulnerability",
    recommendations: &["Update to Next.js 13.5.0 or later"],
}];

static ANGULAR: &[CveEntry] = &[CveEntry {
    cve: "CVE-2023-26117",
    affected_versions: &["14.0.0", "14.1.0", "14.2.0", "15.0.0"],
    fixed_version: "15.2.0",
    severity: "medium",
    description: "Regular expression denial of service",
    recommendations: &["Update to Angular 15.2.0 or later"],
}];

static VUEJS: &[CveEntry] = &[CveEntry {
    cve: "CVE-2024-5987",
    affected_versions: &["2.0.0", "2.1.0", "2.2.0", "2.3.0", "2.4.0", "2.5.0", "2.6.0"],
    fixed_version: "2.7.16",
    severity: "medium",
    description: "XSS vulnerability in certain configurations",
    recommendations: &["Update to Vue.js 2.7.16 or 3.x"],
}];

static EXPRESS: &[CveEntry] = &[CveEntry {
    cve: "CVE-2024-29041",
    affected_versions: &["4.0.0", "4.1.0", "4.2.0", "4.3.0", "4.4.0"],
    fixed_version: "4.19.2",
    severity: "medium",
    description: "Open redirect vulnerability",
    recommendations: &["Update to Express.js 4.19.2 or later"],
}];

static RAILS: &[CveEntry] = &[CveEntry {
    cve: "CVE-2023-22795",
    affected_versions: &["6.0.0", "6.1.0", "7.0.0"],
    fixed_version: "7.0.4.1",
    severity: "high",
    description: "ReDoS vulnerability in Action Dispatch",
    recommendations: &["Update to Rails 7.0.4.1 or later"],
}];

static SPRING: &[CveEntry] = &[CveEntry {
    cve: "CVE-2022-22965",
    affected_versions: &["5.0.0", "5.1.0", "5.2.0", "5.3.0"],
    fixed_version: "5.3.18",
    severity: "critical",
    description: "Spring4Shell RCE vulnerability",
    recommendations: &["Update to Spring 5.3.18 or later", "Disable class binding on user input"],
}];

static SPRING_BOOT: &[CveEntry] = &[CveEntry {
    cve: "CVE-2022-22963",
    affected_versions: &["2.0.0", "2.1.0", "2.2.0", "2.3.0", "2.4.0", "2.5.0", "2.6.0"],
    fixed_version: "2.6.6",
    severity: "critical",
    description: "RCE via Spring Cloud Function",
    recommendations: &["Update to Spring Boot 2.6.6 or later"],
}];

static ASPNET: &[CveEntry] = &[CveEntry {
    cve: "CVE-2023-36899",
    affected_versions: &["4.0", "4.5", "4.6", "4.7", "4.8"],
    fixed_version: "latest security patches",
    severity: "high",
    description: "Elevation of privilege vulnerability",
    recommendations: &["Apply latest security patches", "Ensure proper request validation"],
}];

static JOOMLA: &[CveEntry] = &[CveEntry {
    cve: "CVE-2023-23752",
    affected_versions: &["4.0.0", "4.1.0", "4.2.0"],
    fixed_version: "4.2.8",
    severity: "critical",
    description: "Improper access check allowing unauthorized access to webservice endpoints",
    recommendations: &["Update to Joomla 4.2.8 or later"],
}];

static MAGENTO: &[CveEntry] = &[CveEntry {
    cve: "CVE-2022-24086",
    affected_versions: &["2.3.0", "2.3.1", "2.3.2", "2.4.0", "2.4.1", "2.4.2"],
    fixed_version: "2.4.3-p1",
    severity: "critical",
    description: "Improper input validation leading to arbitrary code execution",
    recommendations: &["Update to Magento 2.4.3-p1 or later"],
}];

/// Known CVEs for `framework`, empty when none are tracked.
pub fn known_cves(framework: &str) -> &'static [CveEntry] {
    match framework {
        "Laravel" => LARAVEL,
        "Django" => DJANGO,
        "WordPress" => WORDPRESS,
        "Drupal" => DRUPAL,
        "Next.js" => NEXTJS,
        "Angular" => ANGULAR,
        "Vue.js" => VUEJS,
        "Express.js" => EXPRESS,
        "Ruby on Rails" => RAILS,
        "Spring" => SPRING,
        "Spring Boot" => SPRING_BOOT,
        "ASP.NET" => ASPNET,
        "Joomla" => JOOMLA,
        "Magento" => MAGENTO,
        _ => &[],
    }
}

/// Returns `"CVE (severity)"` labels and the merged recommendations, first
/// occurrence kept.
pub fn lookup_vulnerabilities(framework: &str, version: &str) -> (Vec<String>, Vec<String>) {
    let mut cves = Vec::new();
    let mut recommendations: Vec<String> = Vec::new();

    for entry in known_cves(framework).iter().filter(|e| e.affects(version)) {
        cves.push(format!("{} ({})", entry.cve, entry.severity));
        for rec in entry.recommendations {
            if !recommendations.iter().any(|r| r == rec) {
                recommendations.push(rec.to_string());
            }
        }
    }

    (cves, recommendations)
}
