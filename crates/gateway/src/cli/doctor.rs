use ho_domain::config::{Config, ConfigSeverity};
use ho_store::{ChatStore, RestChatStore};

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at
/// least one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("handover doctor");
    println!("===============\n");

    let mut all_passed = true;

    check_config_file(config_path, &mut all_passed);
    check_config_validation(config, &mut all_passed);
    check_store(config, &mut all_passed).await;

    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_file(config_path: &str, all_passed: &mut bool) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file exists",
        exists,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );
    if !exists {
        *all_passed = false;
    }
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
    } else {
        print_check(
            "Config validation",
            error_count == 0,
            format!("{} issue(s) ({} error(s))", issues.len(), error_count),
        );
        for issue in &issues {
            println!("      {issue}");
        }
        if error_count > 0 {
            *all_passed = false;
        }
    }
}

/// Probe the store with a single-row chat query.  The webhook has no
/// health endpoint and a probe would trigger a real send, so it is not
/// checked here.
async fn check_store(config: &Config, all_passed: &mut bool) {
    let store = match RestChatStore::new(&config.store) {
        Ok(s) => s,
        Err(e) => {
            print_check("Store connectivity", false, e.to_string());
            *all_passed = false;
            return;
        }
    };

    match store.list_chats(&config.operator.owner_id, 0, 1).await {
        Ok(rows) => print_check(
            "Store connectivity",
            true,
            format!("{} visible chat(s) in the first row", rows.len()),
        ),
        Err(e) => {
            print_check("Store connectivity", false, e.to_string());
            *all_passed = false;
        }
    }
}

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
