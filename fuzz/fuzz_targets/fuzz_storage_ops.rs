#![no_main]
use blockfrag::{compute_stats, defragment, FileId, Storage, Strategy};
use libfuzzer_sys::{
    arbitrary::{Arbitrary, Unstructured},
    fuzz_target,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Arbitrary)]
enum StorageOp {
    Create { size_kb: u8, policy: u8 },
    Delete { file_idx: u8 },
    Resize { file_idx: u8, size_kb: u8 },
    Defragment,
}

// Random operation sequences must never break the storage invariants
fuzz_target!(|input: &[u8]| {
    let mut u = Unstructured::new(input);

    let seed: u64 = match u.arbitrary() {
        Ok(s) => s,
        Err(_) => return,
    };
    let ops: Vec<StorageOp> = match u.arbitrary() {
        Ok(ops) => ops,
        Err(_) => return,
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let mut storage = Storage::new(4, 128);
    let mut ids: Vec<FileId> = Vec::new();

    for op in ops.iter().take(200) {
        match op {
            StorageOp::Create { size_kb, policy } => {
                let strategy = Strategy::ALL[*policy as usize % 3];
                if let Ok((next, id)) =
                    storage.create_file("fuzz", *size_kb as u64, strategy, &mut rng)
                {
                    storage = next;
                    ids.push(id);
                }
            }
            StorageOp::Delete { file_idx } => {
                if ids.is_empty() {
                    continue;
                }
                let id = ids.remove(*file_idx as usize % ids.len());
                storage = storage.delete_file(id).expect("tracked id must exist");
            }
            StorageOp::Resize { file_idx, size_kb } => {
                if ids.is_empty() {
                    continue;
                }
                let id = ids[*file_idx as usize % ids.len()];
                if let Ok(Some(next)) = storage.resize_file(id, *size_kb as u64, &mut rng) {
                    storage = next;
                }
            }
            StorageOp::Defragment => {
                storage = defragment(&storage);
            }
        }

        storage.verify().expect("storage invariants violated");
        let stats = compute_stats(&storage);
        assert_eq!(stats.used_blocks + stats.free_blocks, stats.total_blocks);
    }
});
