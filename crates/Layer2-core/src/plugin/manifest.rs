//! Plugin Manifest - 플러그인 메타데이터 정의
//!
//! - `PluginMetadata`: 레지스트리가 다루는 식별/설명 정보
//! - `PluginManifest`: npm 스타일 패키지 디스크립터 (`codystack` 섹션 포함)

use super::contribution::ContributionDescriptors;
use codystack_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// PluginCategory
// ============================================================================

/// 플러그인 카테고리 (닫힌 열거)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginCategory {
    AiAgents,
    Integrations,
    Formatters,
    TestSuites,
    Devops,
    Themes,
    #[default]
    Custom,
}

impl PluginCategory {
    pub const ALL: [PluginCategory; 7] = [
        Self::AiAgents,
        Self::Integrations,
        Self::Formatters,
        Self::TestSuites,
        Self::Devops,
        Self::Themes,
        Self::Custom,
    ];

    /// 와이어 포맷 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiAgents => "ai-agents",
            Self::Integrations => "integrations",
            Self::Formatters => "formatters",
            Self::TestSuites => "test-suites",
            Self::Devops => "devops",
            Self::Themes => "themes",
            Self::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AiAgents => "AI Agents",
            Self::Integrations => "Integrations",
            Self::Formatters => "Formatters",
            Self::TestSuites => "Test Suites",
            Self::Devops => "DevOps",
            Self::Themes => "Themes",
            Self::Custom => "Custom",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::AiAgents => "🤖",
            Self::Integrations => "🔗",
            Self::Formatters => "✨",
            Self::TestSuites => "🧪",
            Self::Devops => "🚀",
            Self::Themes => "🎨",
            Self::Custom => "🔧",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::AiAgents => "Specialized AI assistants for coding tasks",
            Self::Integrations => "Connect external services and APIs",
            Self::Formatters => "Code formatting and styling tools",
            Self::TestSuites => "Testing frameworks and generators",
            Self::Devops => "Deployment and infrastructure tools",
            Self::Themes => "UI customization and color schemes",
            Self::Custom => "User-defined plugin category",
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PluginAuthor / PluginMetadata
// ============================================================================

/// 플러그인 작성자
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl PluginAuthor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// 플러그인 메타데이터
///
/// `id`는 등록 이후 변경되지 않으며 레지스트리 안에서 고유하다.
/// `version`은 참고용 문자열로, 형식을 강제하지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMetadata {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: PluginCategory,
    #[serde(default)]
    pub author: PluginAuthor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    // 마켓플레이스 데이터
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl PluginMetadata {
    /// 새 메타데이터 생성
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            description: String::new(),
            category: PluginCategory::default(),
            author: PluginAuthor::default(),
            repository: None,
            homepage: None,
            license: None,
            keywords: vec![],
            icon: None,
            downloads: None,
            rating: None,
            featured: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_category(mut self, category: PluginCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_author(mut self, author: PluginAuthor) -> Self {
        self.author = author;
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }
}

// ============================================================================
// PluginManifest (npm 스타일)
// ============================================================================

/// 매니페스트 작성자: 문자열 또는 구조화된 형태
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestAuthor {
    Name(String),
    Detailed(PluginAuthor),
}

impl ManifestAuthor {
    fn to_author(&self) -> PluginAuthor {
        match self {
            Self::Name(name) => PluginAuthor::new(name.clone()),
            Self::Detailed(author) => author.clone(),
        }
    }
}

/// `codystack` 섹션
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodyStackSection {
    pub category: PluginCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activation_events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributes: Option<ContributionDescriptors>,
}

/// npm 스타일 플러그인 매니페스트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub main: String,
    pub codystack: CodyStackSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ManifestAuthor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PluginManifest {
    /// JSON 문자열에서 파싱 후 검증
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: PluginManifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// 필수 필드 검증
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("manifest name is empty".into()));
        }
        if self.version.trim().is_empty() {
            return Err(Error::Validation(format!(
                "manifest {} has an empty version",
                self.name
            )));
        }
        if self.codystack.display_name.trim().is_empty() {
            return Err(Error::Validation(format!(
                "manifest {} has an empty displayName",
                self.name
            )));
        }
        Ok(())
    }

    /// 레지스트리용 메타데이터 (id = 패키지 이름)
    pub fn to_metadata(&self) -> PluginMetadata {
        PluginMetadata {
            id: self.name.clone(),
            name: self.codystack.display_name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            category: self.codystack.category,
            author: self
                .author
                .as_ref()
                .map(ManifestAuthor::to_author)
                .unwrap_or_default(),
            repository: self.repository.clone(),
            homepage: None,
            license: self.license.clone(),
            keywords: self.keywords.clone(),
            icon: self.codystack.icon.clone(),
            downloads: None,
            rating: None,
            featured: None,
        }
    }
}
