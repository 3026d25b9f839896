
use crate::rules::RuleSet;

fn rules(lines: &[&str]) -> RuleSet {
    RuleSet::compile(lines).expect("test rules should compile")
}

fn changed(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}
