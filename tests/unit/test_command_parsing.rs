//! Unit Tests for Command Parsing and Probe Planning

use kubequiz::commands::{self, NormalizedCommand, Token};
use kubequiz::config::{CheckerConfig, ProbeMode};
use kubequiz::execution::Probe;

fn probe(line: &str) -> Option<Vec<String>> {
    Probe::plan(line, &CheckerConfig::default()).map(|p| p.argv())
}

#[test]
fn test_double_quotes_with_escapes() {
    let tokens = commands::tokenize(r#"echo "say \"hi\"" done"#);
    assert_eq!(
        tokens,
        vec![
            Token::Word("echo".into()),
            Token::Word(r#"say "hi""#.into()),
            Token::Word("done".into()),
        ]
    );
}

#[test]
fn test_operators_without_spaces() {
    let segs = commands::segments("kubectl get pods|grep web;echo ok");
    assert_eq!(
        segs,
        vec![vec!["kubectl", "get", "pods"], vec!["grep", "web"], vec!["echo", "ok"]]
    );
}

#[test]
fn test_quoted_operator_is_a_word() {
    let words = commands::first_segment("bash -c 'a | b'");
    assert_eq!(words, vec!["bash", "-c", "a | b"]);
}

#[test]
fn test_help_detection_after_sudo() {
    assert!(commands::is_help_request("sudo kubeadm upgrade -h"));
    assert!(commands::is_help_request("apt-get --help"));
    assert!(!commands::is_help_request("echo kubectl | grep --help-me"));
}

#[test]
fn test_normalize_line_segments() {
    let cmds = NormalizedCommand::from_line("k get no | grep -i ready");
    assert_eq!(cmds.len(), 2);
    assert_eq!(cmds[0].positionals, vec!["kubectl", "get", "node"]);
    assert_eq!(cmds[1].binary, "grep");
    assert!(cmds[1].has_flag("-i"));
}

#[test]
fn test_value_flag_forms_are_equal() {
    let a = NormalizedCommand::from_words(&commands::first_segment("kubectl get pods -n kube-system")).unwrap();
    let b = NormalizedCommand::from_words(&commands::first_segment("kubectl get pods --namespace kube-system")).unwrap();
    let c = NormalizedCommand::from_words(&commands::first_segment("kubectl get po --namespace=kube-system")).unwrap();
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn test_resource_aliases() {
    assert_eq!(commands::resource_alias("pvc"), Some("persistentvolumeclaim"));
    assert_eq!(commands::resource_alias("deployments"), Some("deployment"));
    assert_eq!(commands::resource_alias("widget"), None);
}

#[test]
fn test_probe_plans() {
    let plans = [
        (
            "kubectl run web --image=nginx -- sleep 3600",
            vec!["kubectl", "run", "--dry-run=client", "-o", "yaml", "web", "--image=nginx", "--", "sleep", "3600"],
        ),
        (
            "kubectl create deploy web --image=nginx --dry-run=server",
            vec!["kubectl", "create", "--dry-run=client", "-o", "yaml", "deploy", "web", "--image=nginx"],
        ),
        ("apt-get install -y kubeadm", vec!["apt-get", "install", "-y", "kubeadm", "--help"]),
        ("KUBECONFIG=/tmp/x kubectl get pods", vec!["kubectl", "get", "pods", "--help"]),
        ("bash script.sh", vec!["bash", "-n", "script.sh"]),
    ];
    for (line, expected) in plans {
        let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        assert_eq!(probe(line), Some(expected), "{}", line);
    }
}

#[test]
fn test_probe_modes_follow_config() {
    let mut config = CheckerConfig::default();
    config.probes.clear();
    config.probes.insert("kubectl".to_string(), ProbeMode::Help);

    let plan = Probe::plan("kubectl create sa x", &config).unwrap();
    assert_eq!(plan.mode, ProbeMode::Help);
    assert_eq!(plan.args, vec!["create", "sa", "x", "--help"]);
    assert!(Probe::plan("systemctl restart kubelet", &config).is_none());
}

#[test]
fn test_custom_dry_run_verbs() {
    let config = CheckerConfig {
        dry_run_verbs: vec!["apply".to_string()],
        ..CheckerConfig::default()
    };
    let plan = Probe::plan("kubectl apply -f pod.yaml", &config).unwrap();
    assert_eq!(plan.args, vec!["apply", "--dry-run=client", "-o", "yaml", "-f", "pod.yaml"]);
}
