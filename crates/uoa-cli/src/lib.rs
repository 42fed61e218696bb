use uoa_core::{AppError, ErrorMetadata, LogLevel, NodeId, OrgHierarchy, Person};

/// Printed between people in search results.
pub const SEARCH_SEPARATOR: &str = "        -----------           ";

/// Optional sections of a person's details
#[derive(Debug, Clone, Copy, Default)]
pub struct Sections {
    pub groups: bool,
    pub roles: bool,
    pub department: bool,
}

/// Render a person as the multi-line block shown by `upi` and `search`.
pub fn render_person(person: &Person<'_>, sections: Sections) -> String {
    let mut out = format!(
        "\nFirst name: {}\nLast name: {}\nEmail: {}\nUPI: {}\nTuakiri username: {}\n",
        person.first_name,
        person.last_name,
        person.email,
        person.identifier,
        person.federated_username()
    );

    if sections.roles {
        let roles = person.roles;
        out.push_str(&format!(
            "\nRoles:\n\tStaff: {}\n\tStudent: {}\n\tPostgrad: {}\n\tDoctoral student: {}\n\tContractor: {}\n",
            roles.staff, roles.student, roles.postgraduate, roles.doctoral_student, roles.contractor
        ));
    }

    if sections.groups {
        out.push_str("\nGroups:\n");
        if person.affiliation_ids().is_empty() {
            out.push_str("\tNo groups\n");
        } else {
            for &node in person.affiliation_ids() {
                out.push_str(&person.hierarchy().render_path(node, "\t"));
            }
        }
    }

    if sections.department {
        out.push_str(&format!("\nDepartment:\n\t{}\n", person.department));
    }

    out.push('\n');
    out
}

/// Root paths of `nodes`, each followed by a blank line.
pub fn render_paths(hierarchy: &OrgHierarchy, nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(|&node| format!("{}\n", hierarchy.render_path(node, "")))
        .collect()
}

/// Text printed to stderr when a command fails: the error with its causes, then
/// any hint on what to do about it.
pub fn error_report(err: &AppError) -> String {
    let mut out = err.detailed_message();
    if let Some(action) = err.suggested_action() {
        out.push('\n');
        out.push_str(action);
    }
    if err.is_recoverable() {
        out.push_str("\nThis may be a temporary failure; running the command again can help.");
    }
    out
}

/// Log a failed command at the level its error asks for.
pub fn log_error(err: &AppError) {
    let code = err.error_code();
    let kind = err.error_type();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(error_code = code, error_type = kind, "{}", err),
        LogLevel::Warn => tracing::warn!(error_code = code, error_type = kind, "{}", err),
        LogLevel::Error => tracing::error!(
            error_code = code,
            error_type = kind,
            recoverable = err.is_recoverable(),
            "{}",
            err
        ),
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays clean for output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}
