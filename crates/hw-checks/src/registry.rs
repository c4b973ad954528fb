//! Registry of built-in host checks

use std::fmt;
use std::time::Duration;

use hw_core::{CheckResult, RawExecutionResult};

use crate::parsers;

/// A built-in check run on each reachable target
///
/// Every check is a shell command executed over the target's session, a
/// per-command timeout, and a pure parser turning the raw output into a
/// [`CheckResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    SshConfig,
    Firewall,
    Fail2ban,
    Updates,
    OpenPorts,
    DiskUsage,
    LastLogin,
    Clamav,
    Rkhunter,
    Chkrootkit,
    Auditd,
    Apparmor,
    UnattendedUpgrades,
    SudoUsers,
    SslCert,
}

impl CheckKind {
    /// Every registered check, in report order
    pub const ALL: [CheckKind; 15] = [
        CheckKind::SshConfig,
        CheckKind::Firewall,
        CheckKind::Fail2ban,
        CheckKind::Updates,
        CheckKind::OpenPorts,
        CheckKind::DiskUsage,
        CheckKind::LastLogin,
        CheckKind::Clamav,
        CheckKind::Rkhunter,
        CheckKind::Chkrootkit,
        CheckKind::Auditd,
        CheckKind::Apparmor,
        CheckKind::UnattendedUpgrades,
        CheckKind::SudoUsers,
        CheckKind::SslCert,
    ];

    /// Name used in test lists and as the report key
    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::SshConfig => "ssh_config",
            CheckKind::Firewall => "firewall",
            CheckKind::Fail2ban => "fail2ban",
            CheckKind::Updates => "updates",
            CheckKind::OpenPorts => "open_ports",
            CheckKind::DiskUsage => "disk_usage",
            CheckKind::LastLogin => "last_login",
            CheckKind::Clamav => "clamav",
            CheckKind::Rkhunter => "rkhunter",
            CheckKind::Chkrootkit => "chkrootkit",
            CheckKind::Auditd => "auditd",
            CheckKind::Apparmor => "apparmor",
            CheckKind::UnattendedUpgrades => "unattended_upgrades",
            CheckKind::SudoUsers => "sudo_users",
            CheckKind::SslCert => "ssl_cert",
        }
    }

    /// Look up a check by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|check| check.name() == name)
    }

    /// Names of every registered check
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.name().to_string()).collect()
    }

    /// Shell command run on the target
    ///
    /// Commands fall back to a sentinel line instead of failing when the
    /// underlying tool is absent, so parsers can report `n/a`.
    pub fn command(&self) -> &'static str {
        match self {
            CheckKind::SshConfig => "sshd -T 2>/dev/null || true",
            CheckKind::Firewall => {
                "ufw status 2>/dev/null || iptables -L -n 2>/dev/null || echo 'No firewall found'"
            }
            CheckKind::Fail2ban => {
                "fail2ban-client status 2>/dev/null || echo 'fail2ban not installed'"
            }
            CheckKind::Updates => {
                "apt list --upgradable 2>/dev/null | tail -n +2 || (yum check-update 2>/dev/null | tail -n +2 || echo '')"
            }
            CheckKind::OpenPorts => "ss -tlnp 2>/dev/null || netstat -tlnp 2>/dev/null || echo 'N/A'",
            CheckKind::DiskUsage => "df -h 2>/dev/null | grep -E '^/dev|^Filesystem'",
            CheckKind::LastLogin => "last -n 5 2>/dev/null || echo 'N/A'",
            CheckKind::Clamav => {
                "clamscan --version 2>/dev/null && clamscan -r /tmp --infected 2>/dev/null | tail -5 || echo 'CLAMAV_NOT_INSTALLED'"
            }
            CheckKind::Rkhunter => {
                "rkhunter --version 2>/dev/null && rkhunter -c --skip-keypress 2>/dev/null | tail -50 || echo 'RKHUNTER_NOT_INSTALLED'"
            }
            CheckKind::Chkrootkit => {
                "chkrootkit -V 2>/dev/null && chkrootkit 2>/dev/null | tail -30 || echo 'CHKROOTKIT_NOT_INSTALLED'"
            }
            CheckKind::Auditd => {
                "systemctl is-active auditd 2>/dev/null; auditctl -s 2>/dev/null || echo 'AUDITD_NOT_AVAILABLE'"
            }
            CheckKind::Apparmor => {
                "aa-status 2>/dev/null || (cat /sys/module/apparmor/parameters/enabled 2>/dev/null || echo 'APPARMOR_NOT_AVAILABLE')"
            }
            CheckKind::UnattendedUpgrades => {
                "(dpkg -l unattended-upgrades 2>/dev/null | grep -q ^ii && cat /etc/apt/apt.conf.d/50unattended-upgrades 2>/dev/null) || echo 'UNATTENDED_UPGRADES_NOT_INSTALLED'"
            }
            CheckKind::SudoUsers => {
                "getent group sudo 2>/dev/null || grep -E '^sudo:' /etc/group 2>/dev/null || echo 'N/A'"
            }
            CheckKind::SslCert => {
                "timeout 5 openssl s_client -connect 127.0.0.1:443 -servername localhost 2>/dev/null | openssl x509 -noout -dates -subject 2>/dev/null || echo 'SSL_CERT_NOT_AVAILABLE'"
            }
        }
    }

    /// Upper bound on the command's run time
    pub fn timeout(&self) -> Duration {
        let secs = match self {
            CheckKind::Updates | CheckKind::Clamav => 60,
            CheckKind::Rkhunter | CheckKind::Chkrootkit => 120,
            CheckKind::OpenPorts | CheckKind::SslCert => 15,
            _ => 10,
        };
        Duration::from_secs(secs)
    }

    /// Interpret the command's output
    pub fn parse(&self, raw: &RawExecutionResult) -> CheckResult {
        let out = raw.stdout.as_str();
        match self {
            CheckKind::SshConfig => parsers::ssh_config(out),
            CheckKind::Firewall => parsers::firewall(out),
            CheckKind::Fail2ban => parsers::fail2ban(out),
            CheckKind::Updates => parsers::updates(out),
            CheckKind::OpenPorts => parsers::open_ports(out),
            CheckKind::DiskUsage => parsers::disk_usage(out),
            CheckKind::LastLogin => parsers::last_login(out),
            CheckKind::Clamav => parsers::clamav(out),
            CheckKind::Rkhunter => parsers::rkhunter(out),
            CheckKind::Chkrootkit => parsers::chkrootkit(out),
            CheckKind::Auditd => parsers::auditd(out),
            CheckKind::Apparmor => parsers::apparmor(out),
            CheckKind::UnattendedUpgrades => parsers::unattended_upgrades(out),
            CheckKind::SudoUsers => parsers::sudo_users(out),
            CheckKind::SslCert => parsers::ssl_cert(out),
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
