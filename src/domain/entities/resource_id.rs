//! # Resource IDs
//!
//! Azure Resource Manager ID のパースと生成
//!
//! ```text
//! /subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.DataFactory/factories/{factory}
//! /subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.DataFactory/factories/{factory}/{kind}/{name}
//! ```

use std::fmt;

use crate::domain::errors::DataFactoryError;

const PROVIDER_NAMESPACE: &str = "Microsoft.DataFactory";

/// Data Factory 配下の子リソース種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    Dataset,
    LinkedService,
    Credential,
    Pipeline,
}

impl ChildKind {
    /// ARM ID 上のセグメント名
    pub fn segment(&self) -> &'static str {
        match self {
            ChildKind::Dataset => "datasets",
            ChildKind::LinkedService => "linkedservices",
            ChildKind::Credential => "credentials",
            ChildKind::Pipeline => "pipelines",
        }
    }

    /// 人が読むための表示名
    pub fn display_name(&self) -> &'static str {
        match self {
            ChildKind::Dataset => "Dataset",
            ChildKind::LinkedService => "Linked Service",
            ChildKind::Credential => "Credential",
            ChildKind::Pipeline => "Pipeline",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        [
            ChildKind::Dataset,
            ChildKind::LinkedService,
            ChildKind::Credential,
            ChildKind::Pipeline,
        ]
        .into_iter()
        .find(|kind| kind.segment().eq_ignore_ascii_case(segment))
    }
}

/// Data Factory インスタンスのID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FactoryId {
    pub subscription_id: String,
    pub resource_group: String,
    pub factory_name: String,
}

impl FactoryId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        factory_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            factory_name: factory_name.into(),
        }
    }

    /// Factory ID をパースする
    ///
    /// セグメントのキー（`subscriptions` など）は大文字小文字を区別しない。
    ///
    /// # Errors
    ///
    /// 形式が不正な場合に `DataFactoryError::InvalidId` を返す
    pub fn parse(input: &str) -> Result<Self, DataFactoryError> {
        let segments = split_segments(input)?;
        if segments.len() != 8 {
            return Err(invalid(input, "expected 8 segments for a Data Factory ID"));
        }
        parse_factory_segments(input, &segments)
    }

    /// 同一の Data Factory を指しているか（大文字小文字を区別しない）
    pub fn same_factory(&self, other: &FactoryId) -> bool {
        self.subscription_id.eq_ignore_ascii_case(&other.subscription_id)
            && self.resource_group.eq_ignore_ascii_case(&other.resource_group)
            && self.factory_name.eq_ignore_ascii_case(&other.factory_name)
    }

    /// 子リソースのIDを作成
    pub fn child(&self, kind: ChildKind, name: impl Into<String>) -> ChildResourceId {
        ChildResourceId {
            factory: self.clone(),
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for FactoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/factories/{}",
            self.subscription_id, self.resource_group, PROVIDER_NAMESPACE, self.factory_name
        )
    }
}

/// Data Factory 配下の子リソース（Dataset, Linked Service など）のID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildResourceId {
    pub factory: FactoryId,
    pub kind: ChildKind,
    pub name: String,
}

impl ChildResourceId {
    /// 子リソースIDをパースする
    ///
    /// # Arguments
    ///
    /// * `input` - ARM ID 文字列
    /// * `kind` - 期待する子リソース種別
    ///
    /// # Errors
    ///
    /// 形式不正、または種別が一致しない場合にエラーを返す
    pub fn parse(input: &str, kind: ChildKind) -> Result<Self, DataFactoryError> {
        let segments = split_segments(input)?;
        if segments.len() != 10 {
            return Err(invalid(
                input,
                &format!("expected 10 segments for a {} ID", kind.display_name()),
            ));
        }

        let factory = parse_factory_segments(input, &segments[..8])?;

        match ChildKind::from_segment(segments[8]) {
            Some(found) if found == kind => {}
            _ => {
                return Err(invalid(
                    input,
                    &format!("expected segment {:?}, got {:?}", kind.segment(), segments[8]),
                ))
            }
        }

        Ok(Self {
            factory,
            kind,
            name: segments[9].to_string(),
        })
    }
}

impl fmt::Display for ChildResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.factory, self.kind.segment(), self.name)
    }
}

fn invalid(input: &str, reason: &str) -> DataFactoryError {
    DataFactoryError::InvalidId {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

fn split_segments(input: &str) -> Result<Vec<&str>, DataFactoryError> {
    if !input.starts_with('/') {
        return Err(invalid(input, "ID must start with '/'"));
    }

    let segments: Vec<&str> = input.trim_matches('/').split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid(input, "ID contains an empty segment"));
    }

    Ok(segments)
}

fn parse_factory_segments(input: &str, segments: &[&str]) -> Result<FactoryId, DataFactoryError> {
    let expected_keys = ["subscriptions", "resourceGroups", "providers"];
    for (index, key) in expected_keys.iter().enumerate() {
        if !segments[index * 2].eq_ignore_ascii_case(key) {
            return Err(invalid(
                input,
                &format!("expected segment {:?}, got {:?}", key, segments[index * 2]),
            ));
        }
    }

    if !segments[5].eq_ignore_ascii_case(PROVIDER_NAMESPACE) {
        return Err(invalid(
            input,
            &format!("expected provider {:?}, got {:?}", PROVIDER_NAMESPACE, segments[5]),
        ));
    }

    if !segments[6].eq_ignore_ascii_case("factories") {
        return Err(invalid(
            input,
            &format!("expected segment \"factories\", got {:?}", segments[6]),
        ));
    }

    Ok(FactoryId::new(segments[1], segments[3], segments[7]))
}
