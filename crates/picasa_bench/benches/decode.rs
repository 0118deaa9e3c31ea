use criterion::{criterion_group, criterion_main, Criterion, black_box};
use picasa_db::consts::{NO_PARENT, THUMB_MAGIC, THUMB_RESERVED_LEN};
use picasa_db::{decode_column, decode_variant_time, ColumnKind, ThumbIndex};
use std::path::Path;

const DIRS: u32 = 100;
const FILES_PER_DIR: u32 = 1_000;

fn library() -> Vec<u8> {
    let mut b = THUMB_MAGIC.to_le_bytes().to_vec();
    b.extend_from_slice(&(DIRS * (FILES_PER_DIR + 1)).to_le_bytes());
    let mut push = |name: &str, parent: u32| {
        b.extend_from_slice(name.as_bytes());
        b.push(0);
        b.extend_from_slice(&[0u8; THUMB_RESERVED_LEN]);
        b.extend_from_slice(&parent.to_le_bytes());
    };
    for d in 0..DIRS {
        let dir_idx = d * (FILES_PER_DIR + 1);
        push(&format!("/photos/{d:03}/"), NO_PARENT);
        for f in 0..FILES_PER_DIR {
            push(&format!("IMG_{f:04}.JPG"), dir_idx);
        }
    }
    b
}

fn bench_decode(c: &mut Criterion) {
    let words: Vec<u8> = (0..1_000_000u32).flat_map(|v| v.to_le_bytes()).collect();
    let strings: Vec<u8> = (0..100_000).flat_map(|i| format!("caption {i}\0").into_bytes()).collect();
    let thumbs = library();
    let idx = ThumbIndex::from_bytes(&thumbs, Path::new("bench")).unwrap();

    c.bench_function("u32 column", |bch| {
        bch.iter(|| black_box(decode_column(&mut words.as_slice(), ColumnKind::U32, 1_000_000).unwrap()))
    });
    c.bench_function("string column", |bch| {
        bch.iter(|| black_box(decode_column(&mut strings.as_slice(), ColumnKind::Str, 100_000).unwrap()))
    });
    c.bench_function("thumbindex parse", |bch| {
        bch.iter(|| black_box(ThumbIndex::from_bytes(&thumbs, Path::new("bench")).unwrap()))
    });
    c.bench_function("index_of_file worst case", |bch| {
        bch.iter(|| black_box(idx.index_of_file("/photos/099/IMG_0999.JPG")))
    });
    c.bench_function("variant time", |bch| bch.iter(|| black_box(decode_variant_time(black_box(40788.407998)))));
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
