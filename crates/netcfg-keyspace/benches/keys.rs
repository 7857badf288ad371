use criterion::{Criterion, black_box, criterion_group, criterion_main};
use netcfg_keyspace::{
    Demultiplexer, InterfaceKey, WatchEvent, interface_address_key, interface_key,
    parse_interface_address_key,
};

/// 地址键解析基准：对比普通接口名与含分隔符接口名的开销。
///
/// # 设计目的（Why）
/// - 地址键解析需自右向左切分并解析网络，是 watch 热路径上唯一的非平凡解析；
/// - 含分隔符的接口名不应带来额外的线性扫描。
fn bench_address_parse(c: &mut Criterion) {
    let plain = interface_address_key("eth0", "10.0.0.1/24").expect("地址格式正确");
    let slashed =
        interface_address_key("GigabitEthernet0/8/0/1", "2001:db8::1/64").expect("地址格式正确");

    c.bench_function("address_parse_plain", |b| {
        b.iter(|| parse_interface_address_key(black_box(&plain)))
    });
    c.bench_function("address_parse_slashed", |b| {
        b.iter(|| parse_interface_address_key(black_box(&slashed)))
    });
}

fn bench_classify(c: &mut Criterion) {
    let key = interface_key("Ethernet1/0/1");
    c.bench_function("interface_key_parse", |b| {
        b.iter(|| InterfaceKey::parse(black_box(&key)))
    });

    let events: Vec<WatchEvent> = (0..64)
        .map(|i| WatchEvent::put(interface_key(&format!("Ethernet1/0/{i}"))))
        .collect();
    let demux = Demultiplexer::default();
    c.bench_function("demux_batch_64", |b| {
        b.iter(|| demux.route_batch(black_box(&events)))
    });
}

criterion_group!(keyspace_benches, bench_address_parse, bench_classify);
criterion_main!(keyspace_benches);
