use super::*;

#[test]
fn static_host_reports_registered_elements() {
    let mut host = StaticHost::new().with("poster", Rect::new(10.0, 20.0, 110.0, 220.0));
    let poster = ElementId::new("poster");
    assert!(host.is_mounted(&poster));
    assert_eq!(
        host.bounding_rect(&poster),
        Some(Rect::new(10.0, 20.0, 110.0, 220.0))
    );
    assert!(!host.is_mounted(&ElementId::new("ghost")));
    assert_eq!(host.remove(&poster).map(|r| r.width()), Some(100.0));
    assert!(host.is_empty());
}
