use crate::{
    error::{QueryError, QueryResult},
    projection::{ForwardProjection, ProjectionCatalog},
    source::{SourceDescriptor, SourceKind},
};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Resolves `requested` names against the projections `source` exposes.
///
/// For a sub-query source, an empty request forwards every catalog entry
/// in catalog order; otherwise each name must be in the catalog and the
/// output follows the request order. Expression sources expose no named
/// projections, so any request against them fails.
pub fn resolve_forward_fields<S: AsRef<str>>(
    source: &SourceDescriptor,
    requested: &[S],
    catalog: &ProjectionCatalog,
) -> QueryResult<Vec<ForwardProjection>> {
    match source.kind() {
        SourceKind::Expression => {
            if !requested.is_empty() {
                return Err(QueryError::UnsupportedForwardingOnExpression);
            }
            Ok(Vec::new())
        }
        SourceKind::SubQuery => {
            let projections = if requested.is_empty() {
                forward_all(source, catalog)
            } else {
                forward_requested(source, requested, catalog)?
            };

            debug!(
                alias = source.alias().as_str(),
                forwarded = ?projections.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
                "Resolved forward fields"
            );
            Ok(projections)
        }
    }
}

fn forward_all(source: &SourceDescriptor, catalog: &ProjectionCatalog) -> Vec<ForwardProjection> {
    if catalog.is_empty() {
        warn!(
            "Forwarding all projections of '{}', but its catalog is empty",
            source.alias()
        );
    }

    catalog
        .iter()
        .map(|(name, origin)| ForwardProjection::new(name, origin.clone(), source.alias()))
        .collect()
}

fn forward_requested<S: AsRef<str>>(
    source: &SourceDescriptor,
    requested: &[S],
    catalog: &ProjectionCatalog,
) -> QueryResult<Vec<ForwardProjection>> {
    let mut seen = HashSet::new();
    let mut projections = Vec::with_capacity(requested.len());

    for name in requested.iter().map(|name| name.as_ref()) {
        if !seen.insert(name) {
            return Err(QueryError::DuplicateForwardField(name.to_string()));
        }

        let origin = catalog
            .get(name)
            .ok_or_else(|| QueryError::UnknownForwardField(name.to_string()))?;
        projections.push(ForwardProjection::new(name, origin.clone(), source.alias()));
    }

    Ok(projections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ProjectionOrigin;
    use model::core::{data_type::DataType, value::Value};
    use tracing_test::traced_test;

    fn subquery() -> SourceDescriptor {
        SourceDescriptor::from_subquery("SELECT a FROM t WHERE id = %s", vec![Value::Int(5)], "src")
            .unwrap()
    }

    fn catalog(names: &[&str]) -> ProjectionCatalog {
        names
            .iter()
            .map(|n| (n.to_string(), ProjectionOrigin::typed(DataType::Long)))
            .collect()
    }

    fn names(projections: &[ForwardProjection]) -> Vec<&str> {
        projections.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_empty_request_forwards_whole_catalog_in_order() {
        let catalog = catalog(&["rank", "height_and_weight", "bmi"]);
        let projections = resolve_forward_fields::<&str>(&subquery(), &[], &catalog).unwrap();

        assert_eq!(names(&projections), vec!["rank", "height_and_weight", "bmi"]);
        for projection in &projections {
            assert_eq!(projection.column.qualifier.as_deref(), Some("src"));
            assert_eq!(projection.column.name, projection.name);
        }
    }

    #[test]
    fn test_requested_subset_keeps_request_order() {
        let catalog = catalog(&["rank", "height_and_weight", "bmi"]);
        let projections =
            resolve_forward_fields(&subquery(), &["bmi", "rank"], &catalog).unwrap();

        assert_eq!(names(&projections), vec!["bmi", "rank"]);
    }

    #[test]
    fn test_unknown_name_fails() {
        let catalog = catalog(&["rank"]);
        let err = resolve_forward_fields(&subquery(), &["rank", "score"], &catalog).unwrap_err();
        assert_eq!(err, QueryError::UnknownForwardField("score".to_string()));
    }

    #[test]
    fn test_duplicate_name_fails() {
        let catalog = catalog(&["rank"]);
        let err = resolve_forward_fields(&subquery(), &["rank", "rank"], &catalog).unwrap_err();
        assert_eq!(err, QueryError::DuplicateForwardField("rank".to_string()));
    }

    #[test]
    fn test_expression_sources_cannot_forward() {
        let source = SourceDescriptor::from_expression("pg_backend_pid()", vec![], "pid").unwrap();
        let err = resolve_forward_fields(&source, &["pid"], &catalog(&["pid"])).unwrap_err();
        assert_eq!(err, QueryError::UnsupportedForwardingOnExpression);
    }

    #[test]
    fn test_expression_sources_forward_nothing_by_default() {
        let source = SourceDescriptor::from_expression("pg_backend_pid()", vec![], "pid").unwrap();
        let projections = resolve_forward_fields::<&str>(&source, &[], &catalog(&["pid"])).unwrap();
        assert!(projections.is_empty());
    }

    #[traced_test]
    #[test]
    fn test_empty_catalog_is_logged() {
        let projections =
            resolve_forward_fields::<&str>(&subquery(), &[], &ProjectionCatalog::new()).unwrap();
        assert!(projections.is_empty());
        assert!(logs_contain("catalog is empty"));
    }
}
