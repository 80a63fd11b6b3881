use rstest::rstest;
use tsj_fs::NormalizedPath;

#[test]
fn test_normalize_backslashes_to_forward() {
    let path = NormalizedPath::new("foo\\bar\\baz");
    assert_eq!(path.as_str(), "foo/bar/baz");
}

#[rstest]
#[case("/a/./b", "/a/b")]
#[case("/a//b/", "/a/b")]
#[case("/a/b/../c", "/a/c")]
#[case("/../a", "/a")]
#[case("a/../..", "..")]
#[case("./", ".")]
#[case("C:\\work\\..\\src", "C:/src")]
#[case("//server/share/./x", "//server/share/x")]
fn test_clean(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).clean().as_str(), expected);
}

#[rstest]
#[case("/abs", true)]
#[case("C:/abs", true)]
#[case("//server/share", true)]
#[case("rel/path", false)]
#[case("./rel", false)]
fn test_is_absolute(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(NormalizedPath::new(input).is_absolute(), expected);
}

#[test]
fn test_join_cleans() {
    let base = NormalizedPath::new("/foo/bar");
    assert_eq!(base.join("../baz").as_str(), "/foo/baz");
}

#[test]
fn test_resolve_absolute_segment_replaces_base() {
    let base = NormalizedPath::new("/foo/bar");
    assert_eq!(base.resolve("/etc/x.json").as_str(), "/etc/x.json");
    assert_eq!(base.resolve("x.json").as_str(), "/foo/bar/x.json");
}

#[test]
fn test_parent() {
    assert_eq!(NormalizedPath::new("/foo/bar").parent().unwrap().as_str(), "/foo");
    assert_eq!(NormalizedPath::new("/foo").parent().unwrap().as_str(), "/");
    assert!(NormalizedPath::new("/").parent().is_none());
}

#[test]
fn test_extension_ignores_dotfiles() {
    assert_eq!(NormalizedPath::new("a/tsconfig.json").extension(), Some("json"));
    assert_eq!(NormalizedPath::new("a/.babelrc").extension(), None);
}
