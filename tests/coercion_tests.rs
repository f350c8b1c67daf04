mod common;

use common::*;
use std::error::Error as _;
use tempfile::tempdir;
use trellis::builder::CoercionError;
use trellis::resource::MappedPathResolver;
use trellis::traits::PathError;
use trellis::{Configurator, ConfiguratorConfig, ConfigureError, ErrorKind, shared};

fn in_interface(conf: &mut Configurator) {
    conf.start_child("xInterface").unwrap();
}

fn finished_interface(conf: &mut Configurator) -> trellis::Shared<XInterface> {
    conf.end_child()
        .unwrap()
        .downcast::<XInterface>()
        .unwrap()
}

#[test]
fn test_boolean_tokens_never_fail() -> TestResult {
    for (token, expected) in [
        ("true", true),
        ("yes", true),
        ("on", true),
        ("TRUE", false),
        ("1", false),
        ("", false),
        ("nope", false),
    ] {
        let (mut conf, _) = project_session();
        in_interface(&mut conf);
        conf.set_attribute("enabled", token)?;
        assert_eq!(finished_interface(&mut conf).borrow().enabled, expected, "{token:?}");
    }
    Ok(())
}

#[test]
fn test_numeric_and_char_attributes() -> TestResult {
    let (mut conf, _) = project_session();
    in_interface(&mut conf);
    conf.set_attribute("version", "20260101")?;
    conf.set_attribute("priority", "-3")?;
    conf.set_attribute("separator", ";,")?;
    conf.set_attribute("ratio", "0.75")?;
    let iface = finished_interface(&mut conf);
    let iface = iface.borrow();
    assert_eq!(iface.version, 20_260_101);
    assert_eq!(iface.priority, -3);
    assert_eq!(iface.separator, ';');
    assert!((iface.ratio - 0.75).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn test_empty_char_is_space() -> TestResult {
    let (mut conf, _) = project_session();
    in_interface(&mut conf);
    conf.set_attribute("separator", "")?;
    assert_eq!(finished_interface(&mut conf).borrow().separator, ' ');
    Ok(())
}

#[test]
fn test_malformed_number_is_a_coercion_error() {
    let (mut conf, _) = project_session();
    in_interface(&mut conf);
    let err = conf.set_attribute("priority", "70000").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Coercion);
    let message = err.to_string();
    for part in ["70000", "i16", "priority", "XInterface"] {
        assert!(message.contains(part), "{part} missing from {message}");
    }
    assert!(matches!(
        err,
        ConfigureError::Coercion {
            source: CoercionError::Number(_),
            ..
        }
    ));
}

#[test]
fn test_foreign_type_built_from_its_string_constructor() -> TestResult {
    let (mut conf, _) = project_session();
    in_interface(&mut conf);
    conf.set_attribute("address", "10.0.0.7")?;
    assert_eq!(
        finished_interface(&mut conf).borrow().address,
        Some(std::net::IpAddr::from([10, 0, 0, 7]))
    );

    in_interface(&mut conf);
    let err = conf.set_attribute("address", "not-an-ip").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Coercion);
    assert!(err.to_string().contains("IpAddr"));
    assert!(matches!(
        err,
        ConfigureError::Coercion {
            source: CoercionError::Parse(_),
            ..
        }
    ));
    Ok(())
}

#[test]
fn test_empty_path_resolves_to_base_dir() -> TestResult {
    init_logger();
    let dir = tempdir()?;
    let project = shared(Project::default());
    let config = ConfiguratorConfig {
        confine_paths: true,
        ..ConfiguratorConfig::with_base_dir(dir.path())
    };
    let mut conf = Configurator::with_config(config);
    conf.set_root(project.clone());

    conf.start_child("buildPath")?;
    conf.set_attribute("path", "")?;
    conf.end_child()?;
    assert_eq!(
        project.borrow().build_paths[0].borrow().path.as_deref(),
        Some(dir.path())
    );
    Ok(())
}

#[test]
fn test_string_setter_wins_over_typed_setter() -> TestResult {
    let (mut conf, project) = project_session();
    conf.start_child("buildPath")?;
    conf.set_attribute("label", "42")?;
    conf.end_child()?;
    let project = project.borrow();
    let path = project.build_paths[0].borrow();
    assert_eq!(path.label, "42");
    assert_eq!(path.numeric_label, None);
    Ok(())
}

#[test]
fn test_type_reference_resolves_typedef() -> TestResult {
    let (mut conf, _) = project_session();
    in_interface(&mut conf);
    conf.set_attribute("kind", "selector")?;
    let iface = finished_interface(&mut conf);
    let kind = iface.borrow().kind.clone().unwrap();
    assert!(kind.is::<MyFileSelector>());
    assert!(kind.instantiate().unwrap().is::<MyFileSelector>());

    in_interface(&mut conf);
    let err = conf.set_attribute("kind", "unknown").unwrap_err();
    assert!(matches!(
        err,
        ConfigureError::Coercion {
            source: CoercionError::UnknownType(_),
            ..
        }
    ));
    Ok(())
}

#[test]
fn test_opaque_type_cannot_be_coerced() {
    let (mut conf, _) = project_session();
    in_interface(&mut conf);
    let err = conf.set_attribute("locale", "en_GB").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Coercion);
    assert!(err.to_string().contains("Locale"));
}

#[test]
fn test_paths_resolve_against_base_dir() -> TestResult {
    init_logger();
    let dir = tempdir()?;
    let project = shared(Project::default());
    let mut conf = Configurator::with_config(ConfiguratorConfig::with_base_dir(dir.path()));
    conf.set_root(project.clone());

    conf.start_child("buildPath")?;
    conf.set_attribute("path", "lib/./ext")?;
    conf.set_attribute("recursive", "yes")?;
    conf.end_child()?;

    let project = project.borrow();
    let path = project.build_paths[0].borrow();
    assert_eq!(path.path.as_deref(), Some(dir.path().join("lib").join("ext").as_path()));
    assert!(path.recursive);
    Ok(())
}

#[test]
fn test_confined_paths_reject_escapes() -> TestResult {
    init_logger();
    let dir = tempdir()?;
    let config = ConfiguratorConfig {
        confine_paths: true,
        ..ConfiguratorConfig::with_base_dir(dir.path())
    };
    let mut conf = Configurator::with_config(config);
    conf.set_root(shared(Project::default()));
    conf.start_child("buildPath")?;

    let err = conf.set_attribute("path", "../../etc").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Coercion);
    let cause = err.source().and_then(|e| e.downcast_ref::<CoercionError>());
    assert!(matches!(cause, Some(CoercionError::Path(PathError::Escapes { .. }))));
    Ok(())
}

#[test]
fn test_path_resolver_receives_owner_label() -> TestResult {
    let (mut conf, _) = project_session();
    conf.set_path_resolver(MappedPathResolver::new().with("ivy.xml", "/repo/ivy.xml"));
    assert_eq!(conf.path_resolver().name(), "MappedPathResolver");

    in_interface(&mut conf);
    conf.set_attribute("file", "ivy.xml")?;
    let err = conf.set_attribute("file", "other.xml").unwrap_err();
    assert!(err.to_string().contains("xInterface.file"));

    let iface = finished_interface(&mut conf);
    assert_eq!(
        iface.borrow().file.as_deref(),
        Some(std::path::Path::new("/repo/ivy.xml"))
    );
    Ok(())
}
