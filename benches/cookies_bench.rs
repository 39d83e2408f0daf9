use criterion::{black_box, criterion_group, criterion_main, Criterion};
use requestly::cookies::cookie::Cookie;
use requestly::cookies::jar::{CookieJar, SetCookieOptions};
use requestly::cookies::parser::split_cookies_string;
use url::Url;

fn benchmark_cookie_insert(c: &mut Criterion) {
    let jar = CookieJar::new();
    let url = Url::parse("https://example.com").unwrap();

    c.bench_function("cookie_parse_and_set", |b| {
        b.iter(|| {
            if let Some(cookie) = Cookie::parse(black_box("foo=bar; Path=/; Secure")) {
                let _ = jar.set_cookie(cookie, black_box(&url), SetCookieOptions::default());
            }
        })
    });
}

fn benchmark_cookie_get(c: &mut Criterion) {
    let jar = CookieJar::new();
    let url = Url::parse("https://example.com/foo/bar").unwrap();
    for i in 0..100 {
        let cookie = Cookie::new(format!("cookie{}", i), "val").with_path("/foo");
        jar.set_cookie(cookie, &url, SetCookieOptions::default()).unwrap();
    }

    c.bench_function("cookie_string_for_url", |b| {
        b.iter(|| {
            black_box(jar.get_cookie_string(black_box(&url)));
        })
    });
}

fn benchmark_split_header(c: &mut Criterion) {
    let header = "a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT; Path=/, b=2; HttpOnly, c=3";

    c.bench_function("split_set_cookie", |b| {
        b.iter(|| black_box(split_cookies_string(black_box(header))))
    });
}

criterion_group!(
    benches,
    benchmark_cookie_insert,
    benchmark_cookie_get,
    benchmark_split_header
);
criterion_main!(benches);
