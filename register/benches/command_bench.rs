use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use strato_bank::AccountId;
use strato_nullables::NullStore;
use strato_register::codec::{decode_command, encode_command};
use strato_register::msgs::CreateResourceNode;
use strato_register::{Command, Context, RegistryApp};
use strato_types::{Address, Coin, Description, KeyAlgorithm, PubKey, Timestamp};

fn create_command(seed: u32) -> Command {
    let mut bytes = vec![0x02u8; 33];
    bytes[1..5].copy_from_slice(&seed.to_be_bytes());
    Command::CreateResourceNode(CreateResourceNode {
        network_id: format!("sds://bench-{seed}"),
        pub_key: Some(PubKey::new(KeyAlgorithm::Secp256k1, bytes).unwrap()),
        value: Coin::new("ustos", 1_000),
        owner_address: Address::new([0x42; 20]),
        description: Description::new(format!("bench-{seed}")),
        node_type: 4,
    })
}

fn decode_bench(c: &mut Criterion) {
    let bytes = encode_command(&create_command(1)).unwrap();

    c.bench_function("decode_create_resource_node", |b| {
        b.iter(|| decode_command(black_box(&bytes)).unwrap())
    });
}

fn deliver_bench(c: &mut Criterion) {
    let commands: Vec<Command> = (0..100).map(create_command).collect();

    c.bench_function("deliver_100_create_resource_node", |b| {
        b.iter_batched(
            || {
                let app = RegistryApp::new(NullStore::new());
                app.bank()
                    .mint(
                        &AccountId::Owner(Address::new([0x42; 20])),
                        &Coin::new("ustos", 1_000_000),
                    )
                    .unwrap();
                app
            },
            |app| {
                let ctx = Context::new(1, Timestamp::new(1_000));
                for cmd in &commands {
                    app.deliver(&ctx, black_box(cmd)).unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, decode_bench, deliver_bench);
criterion_main!(benches);
