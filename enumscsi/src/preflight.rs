use std::fs;

static OS_RELEASE: &str = "/etc/os-release";

/// Instructions printed when `iscsiadm` is missing, chosen from the
/// contents of os-release.
pub fn install_hint(os_release: &str) -> Vec<&'static str> {
    let ids = os_release
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            match key.trim() {
                "ID" | "ID_LIKE" => Some(value.trim().trim_matches('"').to_lowercase()),
                _ => None,
            }
        })
        .collect::<Vec<String>>()
        .join(" ");

    let mut hint = vec![
        "Error: 'iscsiadm' is not installed.",
        "Please install it using your system's package manager:",
    ];
    if matches_any(&ids, &["ubuntu", "debian"]) {
        hint.push("  sudo apt update && sudo apt install open-iscsi");
    } else if matches_any(&ids, &["fedora", "centos", "rhel"]) {
        hint.push("  sudo dnf install iscsi-initiator-utils");
    } else if matches_any(&ids, &["arch"]) {
        hint.push("  sudo pacman -S open-iscsi");
    } else {
        hint.push("  Please search for how to install 'iscsiadm' for your Linux distribution.");
    }
    hint
}

fn matches_any(ids: &str, names: &[&str]) -> bool {
    ids.split_whitespace().any(|id| names.contains(&id))
}

/// `install_hint` for the running system.
pub fn local_install_hint() -> Vec<&'static str> {
    let os_release = fs::read_to_string(OS_RELEASE).unwrap_or_default();
    install_hint(&os_release)
}

/// Whether the effective user is root.
pub fn is_root() -> bool {
    // SAFETY: geteuid takes no arguments, touches no memory and cannot fail.
    unsafe { libc::geteuid() == 0 }
}
