//! Parsers for built-in check output
//!
//! Each parser is a pure function of the command's stdout. Tool-absent
//! sentinels map to `n/a`; nothing here ever yields `error`, which is
//! reserved for execution failures.

use hw_core::{CheckResult, CheckStatus};
use serde_json::Value;

const NOT_INSTALLED_HINT: &str = "command not found";

pub fn ssh_config(out: &str) -> CheckResult {
    let lower = out.to_lowercase();
    let mut status = CheckStatus::Pass;
    let mut findings = Vec::new();
    let mut fixes = Vec::new();

    if lower.contains("permitrootlogin yes") {
        status = CheckStatus::Fail;
        findings.push("PermitRootLogin is yes");
        fixes.push("Set PermitRootLogin no in /etc/ssh/sshd_config");
    } else if lower.contains("permitrootlogin") {
        findings.push("PermitRootLogin configured");
    }

    if lower.contains("passwordauthentication yes") {
        status = CheckStatus::Fail;
        findings.push("PasswordAuthentication is yes");
        fixes.push("Set PasswordAuthentication no in /etc/ssh/sshd_config");
    }

    let message = match status {
        CheckStatus::Fail => "Insecure SSH daemon settings",
        _ => "SSH daemon settings OK",
    };

    CheckResult::new(status, message)
        .with_findings(findings)
        .with_fixes(fixes)
        .with_raw_preview(out, 500)
}

pub fn firewall(out: &str) -> CheckResult {
    let lower = out.to_lowercase();
    if lower.contains("inactive") || lower.contains("disabled") {
        return CheckResult::new(CheckStatus::Warn, "Firewall inactive or disabled").with_fixes([
            "Enable UFW: sudo ufw enable",
            "Configure default policy: sudo ufw default deny incoming",
        ]);
    }
    if lower.contains("active") {
        return CheckResult::new(CheckStatus::Pass, "Firewall active");
    }
    CheckResult::new(CheckStatus::Info, "Firewall status unknown")
        .with_fixes(["Install UFW: sudo apt install ufw", "Enable: sudo ufw enable"])
        .with_raw_preview(out, 500)
}

pub fn fail2ban(out: &str) -> CheckResult {
    if out.to_lowercase().contains("not installed") {
        return CheckResult::new(CheckStatus::Warn, "Fail2ban not installed").with_fixes([
            "Install: sudo apt install fail2ban",
            "Enable: sudo systemctl enable fail2ban",
        ]);
    }
    if out.contains("Status") {
        return CheckResult::new(CheckStatus::Pass, "Fail2ban running").with_raw_preview(out, 300);
    }
    CheckResult::new(CheckStatus::Info, "Fail2ban status unknown").with_raw_preview(out, 200)
}

/// Package names from `apt list --upgradable` or `yum check-update` lines
fn pending_packages(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains("Listing"))
        .filter_map(|line| match line.split_once('/') {
            // apt: package/suite version arch [upgradable from: ...]
            Some((pkg, _)) => Some(pkg.trim()),
            None => line.split_whitespace().next(),
        })
        .filter(|pkg| !pkg.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn updates(out: &str) -> CheckResult {
    let out = out.trim();
    let packages = pending_packages(out);
    let count = packages.len();

    let mut result = if count > 0 {
        CheckResult::new(CheckStatus::Warn, format!("{} updates pending", count))
            .with_fix("Run: sudo apt update && sudo apt upgrade -y")
    } else {
        CheckResult::new(CheckStatus::Pass, "0 updates pending")
    };
    result = result
        .with_detail("pendingCount", count)
        .with_detail(
            "packages",
            Value::Array(packages.into_iter().map(Value::String).collect()),
        );
    result.with_raw_preview(out, 5000)
}

pub fn open_ports(out: &str) -> CheckResult {
    let ports: Vec<Value> = out
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| Value::String(l.to_string()))
        .collect();
    let listening = ports.len().saturating_sub(1);

    CheckResult::new(CheckStatus::Info, format!("{} listening socket(s)", listening))
        .with_fixes([
            "Review open ports and close unnecessary services",
            "Use firewall to restrict access to required ports only",
        ])
        .with_detail("ports", Value::Array(ports))
        .with_raw_preview(out, 5000)
}

pub fn disk_usage(out: &str) -> CheckResult {
    let mut status = CheckStatus::Pass;
    let mut findings = Vec::new();

    for line in out.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            continue;
        }
        // Header row ("Use%") does not parse
        let Ok(pct) = parts[4].replace('%', "").parse::<u32>() else {
            continue;
        };
        let mount = parts.get(5).copied().unwrap_or("?");
        if pct >= 90 {
            status = CheckStatus::Fail;
            findings.push(format!("{}: {}% full", mount, pct));
        } else if pct >= 80 {
            if status != CheckStatus::Fail {
                status = CheckStatus::Warn;
            }
            findings.push(format!("{}: {}% full", mount, pct));
        }
    }

    let (message, fix) = match status {
        CheckStatus::Fail => ("Disk nearly full", Some("Free disk space or expand volume")),
        CheckStatus::Warn => ("Disk usage high", Some("Monitor disk usage and plan cleanup")),
        _ => ("Disk usage OK", None),
    };
    if findings.is_empty() {
        findings.push("OK".to_string());
    }

    CheckResult::new(status, message)
        .with_findings(findings)
        .with_fixes(fix)
        .with_raw_preview(out, 500)
}

pub fn last_login(out: &str) -> CheckResult {
    CheckResult::new(CheckStatus::Info, "Recent logins").with_raw_preview(out, 500)
}

pub fn clamav(out: &str) -> CheckResult {
    if out.contains("CLAMAV_NOT_INSTALLED") || out.trim().is_empty() {
        return CheckResult::new(CheckStatus::NotApplicable, "ClamAV not installed").with_fixes([
            "Install: sudo apt install clamav clamav-daemon",
            "Update: sudo freshclam",
        ]);
    }
    if out.contains("Infected files: 0") || out.contains("OK") {
        return CheckResult::new(CheckStatus::Pass, "ClamAV installed, quick scan OK")
            .with_raw_preview(out, 400);
    }
    if out.contains("Infected files:") {
        return CheckResult::new(CheckStatus::Fail, "ClamAV found infected files")
            .with_fix("Review infected files and remove malware")
            .with_raw_preview(out, 500);
    }
    CheckResult::new(CheckStatus::Info, "ClamAV installed").with_raw_preview(out, 400)
}

pub fn rkhunter(out: &str) -> CheckResult {
    if out.contains("RKHUNTER_NOT_INSTALLED") || out.to_lowercase().contains(NOT_INSTALLED_HINT) {
        return CheckResult::new(CheckStatus::NotApplicable, "rkhunter not installed").with_fixes([
            "Install: sudo apt install rkhunter",
            "Update: sudo rkhunter --update",
        ]);
    }

    let warnings: Vec<&str> = out
        .lines()
        .filter(|l| l.contains("Warning"))
        .map(str::trim)
        .take(5)
        .collect();
    if !warnings.is_empty() {
        return CheckResult::new(CheckStatus::Warn, "rkhunter found warnings")
            .with_findings(warnings)
            .with_fix("Review: sudo rkhunter -c --skip-keypress")
            .with_raw_preview(out, 800);
    }
    CheckResult::new(CheckStatus::Pass, "rkhunter scan completed").with_raw_preview(out, 500)
}

pub fn chkrootkit(out: &str) -> CheckResult {
    if out.contains("CHKROOTKIT_NOT_INSTALLED") || out.to_lowercase().contains(NOT_INSTALLED_HINT) {
        return CheckResult::new(CheckStatus::NotApplicable, "chkrootkit not installed")
            .with_fix("Install: sudo apt install chkrootkit");
    }
    if out.contains("INFECTED") || out.contains("Warning:") {
        return CheckResult::new(CheckStatus::Fail, "chkrootkit found potential issues")
            .with_fix("Investigate reported files manually")
            .with_raw_preview(out, 800);
    }
    CheckResult::new(CheckStatus::Pass, "chkrootkit scan completed").with_raw_preview(out, 500)
}

pub fn auditd(out: &str) -> CheckResult {
    if out.contains("AUDITD_NOT_AVAILABLE") {
        return CheckResult::new(CheckStatus::NotApplicable, "auditd not available").with_fixes([
            "Install: sudo apt install auditd",
            "Enable: sudo systemctl enable auditd",
        ]);
    }
    let lower = out.to_lowercase();
    if lower.contains("inactive") || lower.contains("failed") {
        return CheckResult::new(CheckStatus::Warn, "auditd not active").with_fixes([
            "Enable: sudo systemctl enable auditd",
            "Start: sudo systemctl start auditd",
        ]);
    }
    CheckResult::new(CheckStatus::Pass, "auditd active").with_raw_preview(out, 300)
}

pub fn apparmor(out: &str) -> CheckResult {
    if out.contains("APPARMOR_NOT_AVAILABLE") || out.contains("No such file") {
        return CheckResult::new(CheckStatus::NotApplicable, "AppArmor not available")
            .with_fix("AppArmor is typically on Ubuntu; check kernel support");
    }
    // `Y` is the raw value of /sys/module/apparmor/parameters/enabled
    if out.contains('Y') || out.to_lowercase().contains("enabled") || out.contains("profiles are loaded")
    {
        return CheckResult::new(CheckStatus::Pass, "AppArmor enabled").with_raw_preview(out, 400);
    }
    CheckResult::new(CheckStatus::Info, "AppArmor status").with_raw_preview(out, 300)
}

pub fn unattended_upgrades(out: &str) -> CheckResult {
    if out.contains("UNATTENDED_UPGRADES_NOT_INSTALLED") || out.trim().is_empty() {
        return CheckResult::new(CheckStatus::NotApplicable, "unattended-upgrades not installed")
            .with_fixes([
                "Install: sudo apt install unattended-upgrades",
                "Enable: sudo dpkg-reconfigure -plow unattended-upgrades",
            ]);
    }
    CheckResult::new(CheckStatus::Pass, "unattended-upgrades configured").with_raw_preview(out, 500)
}

pub fn sudo_users(out: &str) -> CheckResult {
    if out.contains("N/A") || out.trim().is_empty() {
        return CheckResult::new(CheckStatus::Info, "Could not list sudo group")
            .with_raw_preview(out, 200);
    }

    // group:password:gid:member,member
    let members = out.split(':').nth(3).map(str::trim).unwrap_or_default();
    if members.is_empty() {
        return CheckResult::new(CheckStatus::Info, "Sudo group empty or N/A")
            .with_raw_preview(out, 200);
    }

    let users: Vec<Value> = members
        .split(',')
        .map(|u| Value::String(u.to_string()))
        .collect();
    CheckResult::new(CheckStatus::Info, format!("{} sudo user(s)", users.len()))
        .with_detail("users", Value::Array(users))
        .with_raw_preview(out, 300)
}

pub fn ssl_cert(out: &str) -> CheckResult {
    if out.contains("SSL_CERT_NOT_AVAILABLE") || out.trim().is_empty() {
        return CheckResult::new(
            CheckStatus::NotApplicable,
            "No HTTPS on localhost:443 or openssl unavailable",
        );
    }

    let not_after = out
        .lines()
        .find_map(|l| l.trim().strip_prefix("notAfter="))
        .map(str::trim);
    match not_after {
        Some(expiry) => CheckResult::new(CheckStatus::Info, "SSL cert found")
            .with_fix("Monitor cert expiry and renew before expiration")
            .with_detail("notAfter", expiry)
            .with_raw_preview(out, 400),
        None => CheckResult::new(CheckStatus::Info, "SSL cert info").with_raw_preview(out, 400),
    }
}
