use satis_publish::AccessPolicy;

const INCLUDE_FILE: &str = "include/all$c8233cd260af0878200d33532a634f58473ab51a.json";

fn extension_cases() -> Vec<(&'static str, bool)> {
    vec![
        ("test.json", true),
        ("dist/some.zip", true),
        ("test.JSON", false),
        ("index.php", false),
        ("index.html", false),
        ("README", false),
    ]
}

fn directory_cases() -> Vec<(&'static str, bool)> {
    vec![
        ("satis.json", true),
        ("dist/some.zip", true),
        ("build.zip", true),
        (".hidden/satis.json", false),
        (INCLUDE_FILE, true),
        ("/include/all.json", false),
        ("anywhere/satis.json", false),
        ("include/anywhere/satis.json", false),
        ("anywhere/dist/satis.json", false),
        ("../../../../satis.json", false),
        // windows separators
        ("dist\\some.zip", true),
        ("include\\all$c8233cd260af0878200d33532a634f58473ab51a.json", true),
    ]
}

#[test]
fn default_extensions() {
    let policy = AccessPolicy::default();
    for (path, expected) in extension_cases() {
        assert_eq!(
            policy.is_allowed_extension(path),
            expected,
            "extension check for {path}"
        );
    }
}

#[test]
fn default_directories_at_root() {
    let policy = AccessPolicy::default();
    for (path, expected) in directory_cases() {
        assert_eq!(
            policy.is_allowed_directory(path, "/"),
            expected,
            "directory check for {path}"
        );
    }
}

#[test]
fn default_directories_below_a_base_path() {
    let policy = AccessPolicy::default();
    for base_path in ["/withpath/", "/withpath"] {
        for (path, expected) in directory_cases() {
            assert_eq!(
                policy.is_allowed_directory(path, base_path),
                expected,
                "directory check for {path} under {base_path}"
            );
        }
    }
}

#[test]
fn backslash_and_slash_are_equivalent() {
    let policy = AccessPolicy::default();
    assert_eq!(
        policy.is_allowed("dist\\some.zip", "/"),
        policy.is_allowed("dist/some.zip", "/")
    );
    assert_eq!(
        policy.is_allowed("include\\anywhere\\satis.json", "/"),
        policy.is_allowed("include/anywhere/satis.json", "/")
    );
}

#[test]
fn is_allowed_needs_both_checks() {
    let policy = AccessPolicy::default();
    assert!(policy.is_allowed("satis.json", "/"));
    assert!(policy.is_allowed(INCLUDE_FILE, "/"));
    assert!(!policy.is_allowed("index.php", "/"));
    assert!(!policy.is_allowed("anywhere/satis.json", "/"));
    assert!(!policy.is_allowed("dist/some.tar", "/"));
}

#[test]
fn other_extensions() {
    let mut policy = AccessPolicy::default();
    policy.set_allowed_files(["yml"]);

    let cases = [
        ("test.json", false),
        ("dist/some.zip", false),
        ("index.php", false),
        ("index.html", false),
        ("index.yml", true),
    ];
    for (path, expected) in cases {
        assert_eq!(policy.is_allowed_extension(path), expected, "{path}");
    }
}

#[test]
fn other_directories() {
    let mut policy = AccessPolicy::default();
    policy.set_allowed_directories(["yaml"]);

    let cases = [
        ("satis.json", true),
        ("dist/some.zip", false),
        ("yaml/some.yml", true),
        ("build.zip", true),
        ("yaml\\some.zip", true),
        ("include\\all$c8233cd260af0878200d33532a634f58473ab51a.json", false),
    ];
    for (path, expected) in cases {
        assert_eq!(policy.is_allowed_directory(path, "/"), expected, "{path}");
    }
}

#[test]
fn setters_replace_rather_than_merge() {
    let mut policy = AccessPolicy::default();
    policy
        .set_allowed_files(["yml"])
        .set_allowed_directories(["yaml"])
        .set_accept_bundle(false)
        .set_need_authentication(false);

    assert_eq!(policy.allowed_extensions(), ["yml".to_string()]);
    assert_eq!(policy.allowed_directories(), ["yaml".to_string()]);
    assert!(!policy.accepts_bundle_upload());
    assert!(!policy.requires_authentication());
}

#[test]
fn defaults() {
    let policy = AccessPolicy::default();
    assert_eq!(policy.allowed_extensions(), ["json", "zip"]);
    assert_eq!(policy.allowed_directories(), ["dist", "include"]);
    assert!(policy.requires_authentication());
    assert!(policy.accepts_bundle_upload());
}
