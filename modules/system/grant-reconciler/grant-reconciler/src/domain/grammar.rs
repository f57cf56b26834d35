//! Grant string grammar.
//!
//! Privileges are classified by an ordered rule table. The rules overlap
//! syntactically (`SELECT ON SCHEMA X` also reads as an object grant, and any
//! verb reads as a system privilege), so the first matching rule wins. A rule
//! that matches but rejects its input is an error; the next rule is not tried.

use std::sync::LazyLock;

use grant_reconciler_sdk::{GrantError, GrantOption, Privilege, PrivilegeKind, Role};
use regex::{Captures, Regex};

/// One or more words. Verbs never contain commas; lists are built by the batcher.
const VERB: &str = r"[A-Za-z_][A-Za-z0-9_]*(?: [A-Za-z_][A-Za-z0-9_]*)*";

/// Bare or double-quoted identifier without a schema qualifier.
/// Inside quotes a doubled `""` stands for one literal quote.
const IDENT: &str = r#"(?:"(?:[^"]|"")+"|[^\s."]+)"#;

/// Words that belong to clauses and never appear inside a verb.
const RESERVED: &[&str] = &["ON", "WITH"];

/// Builds `(name, target)` from a rule's captures and the default schema.
/// `None` rejects the input.
type Build = fn(&Captures<'_>, &str) -> Option<(String, String)>;

struct Rule {
    kind: PrivilegeKind,
    pattern: Regex,
    build: Build,
}

impl Rule {
    #[allow(clippy::expect_used)] // static patterns, they don't panic
    fn new(kind: PrivilegeKind, pattern: &str, build: Build) -> Self {
        Self {
            kind,
            pattern: Regex::new(&format!("(?i)^{pattern}$"))
                .expect("static regex should not panic"),
            build,
        }
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            PrivilegeKind::UserGroup,
            &format!("USERGROUP OPERATOR ON USERGROUP ({IDENT})"),
            build_usergroup,
        ),
        Rule::new(
            PrivilegeKind::ColumnKey,
            &format!("({VERB}) ON CLIENTSIDE ENCRYPTION COLUMN KEY ({IDENT})"),
            build_column_key,
        ),
        Rule::new(
            PrivilegeKind::Source,
            &format!("({VERB}) ON REMOTE SOURCE ({IDENT})"),
            build_targeted,
        ),
        Rule::new(
            PrivilegeKind::Schema,
            &format!("({VERB}) ON SCHEMA ({IDENT})"),
            build_targeted,
        ),
        Rule::new(
            PrivilegeKind::Object,
            &format!(r"({VERB}) ON ({IDENT}\.{IDENT})"),
            build_targeted,
        ),
        Rule::new(
            PrivilegeKind::Object,
            &format!("({VERB}) ON ({IDENT})"),
            build_unqualified_object,
        ),
        Rule::new(
            PrivilegeKind::Structured,
            &format!("STRUCTURED PRIVILEGE ({IDENT})"),
            build_structured,
        ),
        Rule::new(PrivilegeKind::System, &format!("({VERB})"), build_system),
    ]
});

#[allow(clippy::expect_used)] // static pattern, it doesn't panic
static OPTION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(.*) )?WITH (ADMIN|GRANT) OPTION$").expect("static regex should not panic")
});

#[allow(clippy::expect_used)] // static pattern, it doesn't panic
static ROLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{IDENT}(?:\.{IDENT})?$")).expect("static regex should not panic")
});

fn build_usergroup(caps: &Captures<'_>, _default_schema: &str) -> Option<(String, String)> {
    Some(("USERGROUP OPERATOR".to_owned(), caps[1].to_owned()))
}

fn build_column_key(caps: &Captures<'_>, _default_schema: &str) -> Option<(String, String)> {
    let verb = verb(&caps[1])?;
    (verb == "USAGE").then(|| (verb, caps[2].to_owned()))
}

fn build_targeted(caps: &Captures<'_>, _default_schema: &str) -> Option<(String, String)> {
    Some((verb(&caps[1])?, caps[2].to_owned()))
}

fn build_unqualified_object(
    caps: &Captures<'_>,
    default_schema: &str,
) -> Option<(String, String)> {
    let verb = verb(&caps[1])?;
    let object = &caps[2];
    let target = if default_schema.is_empty() {
        object.to_owned()
    } else {
        format!("{default_schema}.{object}")
    };
    Some((verb, target))
}

fn build_structured(caps: &Captures<'_>, _default_schema: &str) -> Option<(String, String)> {
    Some(("STRUCTURED PRIVILEGE".to_owned(), caps[1].to_owned()))
}

fn build_system(caps: &Captures<'_>, _default_schema: &str) -> Option<(String, String)> {
    Some((verb(&caps[1])?, String::new()))
}

fn verb(raw: &str) -> Option<String> {
    let reserved = raw
        .split(' ')
        .any(|word| RESERVED.iter().any(|r| word.eq_ignore_ascii_case(r)));
    (!reserved).then(|| raw.to_ascii_uppercase())
}

/// Trim and collapse runs of whitespace into single spaces.
/// Quoted identifiers are copied untouched.
fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut quoted = false;
    let mut pending_space = false;

    for c in raw.chars() {
        if quoted {
            quoted = c != '"';
            out.push(c);
        } else if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            quoted = c == '"';
            out.push(c);
        }
    }

    out
}

/// Split a trailing `WITH ADMIN OPTION` / `WITH GRANT OPTION` off a normalized string.
fn split_option(normalized: &str) -> (&str, Option<GrantOption>) {
    let Some(caps) = OPTION_SUFFIX.captures(normalized) else {
        return (normalized, None);
    };
    let body = caps.get(1).map_or("", |m| m.as_str());
    let option = if caps[2].eq_ignore_ascii_case("ADMIN") {
        GrantOption::Admin
    } else {
        GrantOption::Grant
    };
    (body, Some(option))
}

fn check_option(
    raw: &str,
    found: Option<GrantOption>,
    expected: GrantOption,
) -> Result<bool, GrantError> {
    match found {
        None => Ok(false),
        Some(option) if option == expected => Ok(true),
        Some(option) => Err(GrantError::InvalidOption {
            input: raw.to_owned(),
            option,
        }),
    }
}

/// Parse a privilege string.
///
/// Unqualified object names are qualified with `default_schema`.
///
/// # Errors
///
/// - `UnknownPrivilege` for empty input or input matching no rule
/// - `InvalidOption` when the option suffix does not fit the privilege kind
pub fn parse_privilege(raw: &str, default_schema: &str) -> Result<Privilege, GrantError> {
    let unknown = || GrantError::UnknownPrivilege(raw.to_owned());

    let normalized = normalize(raw);
    let (body, option) = split_option(&normalized);
    if body.is_empty() {
        return Err(unknown());
    }

    let (rule, caps) = RULES
        .iter()
        .find_map(|rule| rule.pattern.captures(body).map(|caps| (rule, caps)))
        .ok_or_else(unknown)?;
    let (name, target) = (rule.build)(&caps, default_schema).ok_or_else(unknown)?;
    let grantable = check_option(raw, option, rule.kind.grant_option())?;

    Ok(Privilege::new(rule.kind, name, target, grantable))
}

/// Parse a role reference: `name` or `schema.name`, parts optionally quoted.
///
/// Quotes are kept, so the role renders back to the same identifier.
///
/// # Errors
///
/// - `UnknownRole` for empty or malformed input
/// - `InvalidOption` for `WITH GRANT OPTION`
pub fn parse_role(raw: &str) -> Result<Role, GrantError> {
    let normalized = normalize(raw);
    let (body, option) = split_option(&normalized);

    if !ROLE.is_match(body) {
        return Err(GrantError::UnknownRole(raw.to_owned()));
    }
    let grantable = check_option(raw, option, GrantOption::Admin)?;

    Ok(Role::new(body, grantable))
}

/// Parse every entry, stopping at the first malformed one.
///
/// # Errors
///
/// The first error from [`parse_privilege`].
pub fn parse_privileges(
    raw: &[String],
    default_schema: &str,
) -> Result<Vec<Privilege>, GrantError> {
    raw.iter()
        .map(|entry| parse_privilege(entry, default_schema))
        .collect()
}

/// Parse every entry, stopping at the first malformed one.
///
/// # Errors
///
/// The first error from [`parse_role`].
pub fn parse_roles(raw: &[String]) -> Result<Vec<Role>, GrantError> {
    raw.iter().map(|entry| parse_role(entry)).collect()
}

/// Parse and re-render privileges into canonical strings.
///
/// # Errors
///
/// The first error from [`parse_privilege`].
pub fn canonicalize_privileges(
    raw: &[String],
    default_schema: &str,
) -> Result<Vec<String>, GrantError> {
    Ok(parse_privileges(raw, default_schema)?
        .iter()
        .map(|p| p.render(default_schema))
        .collect())
}

/// Parse and re-render roles into canonical strings.
///
/// # Errors
///
/// The first error from [`parse_role`].
pub fn canonicalize_roles(raw: &[String]) -> Result<Vec<String>, GrantError> {
    Ok(parse_roles(raw)?.iter().map(Role::render).collect())
}
