//! Product scopes selected with slash-command prefixes.
//!
//! A message like `/지하철 프리미엄 해지 방법` is restricted to one app; a message
//! without a prefix searches every app.

/// Which product(s) a user question is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceScope {
    #[default]
    All,
    Subway,
    Bus,
    Move,
}

impl ServiceScope {
    /// Scoped variants in prefix-matching priority order
    pub const APPS: [ServiceScope; 3] = [ServiceScope::Subway, ServiceScope::Bus, ServiceScope::Move];

    /// Short label shown in the transcript badge
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ServiceScope::All => "전체",
            ServiceScope::Subway => "지하철",
            ServiceScope::Bus => "버스",
            ServiceScope::Move => "무브",
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            ServiceScope::All => "🔍",
            ServiceScope::Subway => "🚇",
            ServiceScope::Bus => "🚌",
            ServiceScope::Move => "🚗",
        }
    }

    /// Canonical app name used in scoping instructions. `None` for [`ServiceScope::All`].
    #[must_use]
    pub fn app_name(self) -> Option<&'static str> {
        match self {
            ServiceScope::All => None,
            ServiceScope::Subway => Some("지하철종결자"),
            ServiceScope::Bus => Some("전국스마트버스"),
            ServiceScope::Move => Some("스마트무브"),
        }
    }

    /// Literal command prefix selecting this scope. `None` for [`ServiceScope::All`].
    #[must_use]
    pub fn command(self) -> Option<&'static str> {
        match self {
            ServiceScope::All => None,
            ServiceScope::Subway => Some("/지하철"),
            ServiceScope::Bus => Some("/버스"),
            ServiceScope::Move => Some("/무브"),
        }
    }

    /// One-line description for help output
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ServiceScope::All => "명령어 없이 질문하면 전체 앱에서 검색합니다",
            ServiceScope::Subway => "지하철종결자 앱만 검색",
            ServiceScope::Bus => "전국스마트버스 앱만 검색",
            ServiceScope::Move => "스마트무브 앱만 검색",
        }
    }

    /// App names of the other two scoped variants, in registry order
    fn excluded_app_names(self) -> Vec<&'static str> {
        Self::APPS
            .iter()
            .filter(|scope| **scope != self)
            .filter_map(|scope| scope.app_name())
            .collect()
    }
}

/// Splits raw input into its scope and the question text.
///
/// Total over every input: the first matching prefix wins, otherwise the
/// trimmed text is returned unchanged under [`ServiceScope::All`].
#[must_use]
pub fn parse_command(raw: &str) -> (ServiceScope, String) {
    let text = raw.trim();

    for scope in ServiceScope::APPS {
        if let Some(rest) = scope.command().and_then(|prefix| text.strip_prefix(prefix)) {
            return (scope, rest.trim().to_string());
        }
    }

    (ServiceScope::All, text.to_string())
}

/// Restriction appended to the question for a scoped query, empty for `All`
#[must_use]
pub fn scope_instruction(scope: ServiceScope) -> String {
    let Some(app_name) = scope.app_name() else {
        return String::new();
    };
    let others = scope.excluded_app_names().join(", ");
    format!(
        "\n\n[중요: {app_name} 앱에 관련된 내용만 답변하세요. 다른 앱({others})에 대한 질문이면 '이 질문은 {app_name} 앱과 관련이 없습니다'라고 안내하세요.]"
    )
}

/// The prompt actually sent upstream: question text followed by the scope restriction
#[must_use]
pub fn compose_prompt(scope: ServiceScope, cleaned: &str) -> String {
    let mut prompt = cleaned.to_string();
    prompt.push_str(&scope_instruction(scope));
    prompt
}
