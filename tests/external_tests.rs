// Parser tests for the docker and systemctl shell-out output formats

use gopanel::external::docker::{apply_stats, parse_mem_size, parse_ps_output};
use gopanel::external::services::parse_list_units;

#[test]
fn test_parse_ps_output() {
    let out = concat!(
        r#"{"id":"abc123","name":"web","image":"nginx:latest","status":"Up 2 hours","state":"running","ports":"0.0.0.0:80->80/tcp","created":"2026-08-01 10:00:00 +0000 UTC"}"#,
        "\n",
        r#"{"id":"def456","name":"db","image":"postgres:16","status":"Exited (0) 3 days ago","state":"exited","ports":"","created":"2026-07-20 08:30:00 +0000 UTC"}"#,
        "\n",
    );
    let containers = parse_ps_output(out);
    assert_eq!(containers.len(), 2);
    assert_eq!(containers[0].id, "abc123");
    assert_eq!(containers[0].name, "web");
    assert_eq!(containers[0].image, "nginx:latest");
    assert_eq!(containers[0].state, "running");
    assert_eq!(containers[1].name, "db");
    assert_eq!(containers[1].state, "exited");
    // Stats fields stay zero until enrichment.
    assert_eq!(containers[0].cpu_percent, 0.0);
    assert_eq!(containers[0].mem_used, 0);
}

#[test]
fn test_parse_ps_output_skips_malformed_lines() {
    let out = "not json\n\n{\"id\":\"x\",\"name\":\"y\",\"image\":\"z\",\"status\":\"\",\"state\":\"\",\"ports\":\"\",\"created\":\"\"}\n{broken\n";
    let containers = parse_ps_output(out);
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].id, "x");
}

#[test]
fn test_apply_stats_merges_by_id() {
    let mut containers = parse_ps_output(
        r#"{"id":"abc123","name":"web","image":"nginx","status":"Up","state":"running","ports":"","created":""}"#,
    );
    let stats = "abc123\t1.25%\t3.50%\t128MiB / 2GiB\nzzz999\t99.0%\t99.0%\t1GiB / 1GiB\n";
    apply_stats(&mut containers, stats);

    assert_eq!(containers[0].cpu_percent, 1.25);
    assert_eq!(containers[0].mem_percent, 3.5);
    assert_eq!(containers[0].mem_used, 128 * 1024 * 1024);
    assert_eq!(containers[0].mem_limit, 2 * 1024 * 1024 * 1024);
}

#[test]
fn test_apply_stats_ignores_short_rows() {
    let mut containers = parse_ps_output(
        r#"{"id":"abc123","name":"web","image":"nginx","status":"Up","state":"running","ports":"","created":""}"#,
    );
    apply_stats(&mut containers, "abc123\t1.0%\n");
    assert_eq!(containers[0].cpu_percent, 0.0);
}

#[test]
fn test_parse_mem_size() {
    assert_eq!(parse_mem_size("512B"), 512);
    assert_eq!(parse_mem_size("1KiB"), 1024);
    assert_eq!(parse_mem_size("128MiB"), 128 * 1024 * 1024);
    assert_eq!(parse_mem_size("2GiB"), 2 * 1024 * 1024 * 1024);
    assert_eq!(parse_mem_size("500KB"), 500_000);
    assert_eq!(parse_mem_size("1.5GB"), 1_500_000_000);
    assert_eq!(parse_mem_size(" 64MiB "), 64 * 1024 * 1024);
    assert_eq!(parse_mem_size("garbage"), 0);
    assert_eq!(parse_mem_size(""), 0);
}

#[test]
fn test_parse_list_units() {
    let out = "\
ssh.service            loaded active running OpenBSD Secure Shell server
cron.service           loaded active running Regular background program processing daemon
dead.service           not-found inactive dead dead.service
networkd-dispatcher.service loaded active running Dispatcher daemon for systemd-networkd
";
    let units = parse_list_units(out);
    assert_eq!(units.len(), 4);
    assert_eq!(units[0].unit, "ssh.service");
    assert_eq!(units[0].load, "loaded");
    assert_eq!(units[0].active, "active");
    assert_eq!(units[0].sub, "running");
    assert_eq!(units[0].description, "OpenBSD Secure Shell server");
    assert_eq!(units[2].load, "not-found");
}

#[test]
fn test_parse_list_units_skips_non_service_lines() {
    let out = "\
boot.mount             loaded active mounted /boot
ssh.service            loaded active running OpenBSD Secure Shell server

";
    let units = parse_list_units(out);
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].unit, "ssh.service");
}
