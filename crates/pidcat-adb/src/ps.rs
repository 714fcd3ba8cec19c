use std::sync::LazyLock;

use regex::Regex;

use pidcat_types::ProcessInfo;

/// `USER PID PPID VSZ RSS WCHAN ADDR S NAME`
static PS_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\S+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+(\S+)\s+(\S+)\s+(\S)\s+(\S+)")
        .expect("ps row pattern is valid")
});

/// Parse `adb shell ps` output, skipping rows that don't have the
/// expected columns (the header, blank lines)
pub fn parse_processes(output: &str) -> Vec<ProcessInfo> {
    output
        .lines()
        .filter_map(|line| {
            let caps = PS_ROW.captures(line)?;
            let field = |i: usize| caps[i].trim().to_string();
            Some(ProcessInfo {
                user: field(1),
                pid: field(2),
                ppid: field(3),
                vsz: field(4),
                rss: field(5),
                wchan: field(6),
                addr: field(7),
                state: field(8),
                name: field(9),
            })
        })
        .collect()
}

/// First process whose name matches `package`, ignoring case
pub(crate) fn find_pid<'a>(processes: &'a [ProcessInfo], package: &str) -> Option<&'a str> {
    processes
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(package))
        .map(|p| p.pid.as_str())
}
